use mkproject::error::Error;
use mkproject::parser::parse_structure;
use mkproject::structure::{FileSource, Node, Overrides};

#[test]
fn test_parse_vocabulary() {
    let text = r#"
- README.md
- file: main.py
  content: print("{mp:title}")
- file: LICENSE
  template: licenses/MIT
- folder: docs
  contents:
    - index.md
  template: docs-skeleton
- file_template: gitignore/python
- folder_template: latex
- project_template: api
  overrides:
    title: "{mp:title} API"
- dynamic: "quizzes()"
"#;
    let structure = parse_structure(text).unwrap();

    assert_eq!(
        structure.nodes,
        vec![
            Node::file("README.md", ""),
            Node::file("main.py", "print(\"{mp:title}\")"),
            Node::File {
                name: "LICENSE".to_string(),
                source: FileSource::Template("licenses/MIT".to_string()),
            },
            Node::Folder {
                name: "docs".to_string(),
                children: vec![Node::file("index.md", "")],
                template: Some("docs-skeleton".to_string()),
            },
            Node::FileTemplate { path: "gitignore/python".to_string() },
            Node::FolderTemplate { path: "latex".to_string() },
            Node::ProjectTemplate {
                name: "api".to_string(),
                overrides: Overrides { title: Some("{mp:title} API".to_string()), description: None },
            },
            Node::DynamicList { code: "quizzes()".to_string() },
        ]
    );
    assert!(structure.title.is_none());
}

#[test]
fn test_implicit_folder() {
    let text = "- src:\n    - main.rs\n    - bin:\n        - cli.rs\n- empty:\n";
    let structure = parse_structure(text).unwrap();

    assert_eq!(
        structure.nodes,
        vec![
            Node::folder(
                "src",
                vec![Node::file("main.rs", ""), Node::folder("bin", vec![Node::file("cli.rs", "")])]
            ),
            Node::folder("empty", vec![]),
        ]
    );
}

#[test]
fn test_unquoted_token_names() {
    let text = "- {mp:title}.md\n- {mp:title}\n- folder: {mp:title}\n";
    let structure = parse_structure(text);

    // `{mp:title}.md` is a YAML syntax error, so quoting is required there.
    assert!(structure.is_err());

    let structure = parse_structure("- {mp:title}\n- folder: {mp:title}\n").unwrap();
    assert_eq!(
        structure.nodes,
        vec![Node::file("{mp:title}", ""), Node::folder("{mp:title}", vec![])]
    );
}

#[test]
fn test_files_mapping_and_leading_comment() {
    let text = "title: Shop\ndescription: Online store\nfiles:\n  - README.md\n";
    let structure = parse_structure(text).unwrap();
    assert_eq!(structure.title.as_deref(), Some("Shop"));
    assert_eq!(structure.description.as_deref(), Some("Online store"));
    assert_eq!(structure.nodes, vec![Node::file("README.md", "")]);

    let text = "# A small Python package\n- setup.py\n";
    let structure = parse_structure(text).unwrap();
    assert_eq!(structure.description.as_deref(), Some("A small Python package"));
}

#[test]
fn test_tabs_and_empty_documents() {
    let structure = parse_structure("- src:\n\t- main.rs\n").unwrap();
    assert_eq!(structure.nodes, vec![Node::folder("src", vec![Node::file("main.rs", "")])]);

    assert!(parse_structure("").unwrap().nodes.is_empty());
    assert!(parse_structure("# only a comment\n").unwrap().nodes.is_empty());
}

#[test]
fn test_scalar_names() {
    let structure = parse_structure("- 2024\n- file: 42\n").unwrap();
    assert_eq!(structure.nodes, vec![Node::file("2024", ""), Node::file("42", "")]);
}

#[test]
fn test_invalid_items() {
    let cases = [
        "- file: a.txt\n  content: x\n  template: y\n",
        "- file: a.txt\n  mode: 644\n",
        "- folder: src\n  contents: main.rs\n",
        "- project_template: api\n  overrides: [title]\n",
        "- project_template: api\n  overrides:\n    name: x\n",
        "- file:\n",
        "- a: [x]\n  b: [y]\n",
        "- [nested]\n",
        "files: README.md\n",
        "just text\n",
    ];

    for text in cases {
        match parse_structure(text) {
            Err(Error::ParseError { line: None, .. }) => {}
            other => panic!("Expected ParseError for {text:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_yaml_error_has_line() {
    let text = "- README.md\n- folder: src\n  contents:\n    - main.rs\n   - bad: [\n";
    match parse_structure(text) {
        Err(Error::ParseError { line: Some(line), .. }) => assert!(line >= 4),
        other => panic!("Expected ParseError with a line, got {other:?}"),
    }
}
