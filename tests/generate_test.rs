use mkproject::conflict::{Decision, FixedPolicy};
use mkproject::evaluator::MiniJinjaEvaluator;
use mkproject::expander::Expander;
use mkproject::materializer::{materialize, Status};
use mkproject::parser::parse_structure;
use mkproject::store::DirectoryStore;
use mkproject::token::{TokenContext, TokenValue};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const STRUCTURE: &str = r##"
# Course material
title: Linear Algebra
files:
  - file: README.md
    content: "# {mp:title}\n\n{mp:description}\n"
  - file_template: licenses/LICENSE
  - folder: "{mp:formatted_title}"
    contents:
      - folder_template: latex
      - exercises:
          - dynamic: |
              {% for i in range(1, 3) %}
              - file: "Sheet {{ i }}.tex"
                content: "% {mp:filename} by {mp:author}"
              {% endfor %}
  - project_template: python
    overrides:
      title: "{mp:title} Tools"
"##;

#[test_log::test]
fn test_generate_project() {
    let temp_dir = TempDir::new().unwrap();
    let templates = temp_dir.path().join("templates");
    let projects = temp_dir.path().join("projects");
    write(&templates, "licenses/LICENSE", "Copyright {mp:author}\n");
    write(&templates, "latex/main.tex", "\\title{{mp:title}}\n");
    write(&templates, "latex/sections/intro.tex", "\\section{Intro}\n");
    write(
        &projects,
        "python.yaml",
        "- tools:\n    - file: \"{mp:formatted_title}.py\"\n      content: \"# {mp:title}\"\n",
    );

    let structure = parse_structure(STRUCTURE).unwrap();
    assert_eq!(structure.description.as_deref(), Some("Course material"));

    let store = DirectoryStore::new(&templates, &projects).unwrap();
    let evaluator = MiniJinjaEvaluator::new();
    let context = TokenContext::new(structure.title.clone().unwrap_or_default(), "Course material")
        .with_custom_tokens([("Author", TokenValue::text("Ada"))]);
    let tree = Expander::new(&store, &evaluator)
        .expand_tree(&structure.nodes, &context, None)
        .unwrap();

    let output = temp_dir.path().join("output");
    let report = materialize(&tree, &output, &mut FixedPolicy::new(Decision::Skip));
    assert_eq!(report.status, Status::Completed);

    let expected = temp_dir.path().join("expected");
    write(&expected, "README.md", "# Linear Algebra\n\nCourse material\n");
    write(&expected, "LICENSE", "Copyright Ada\n");
    write(&expected, "linear_algebra/main.tex", "\\title{Linear Algebra}\n");
    write(&expected, "linear_algebra/sections/intro.tex", "\\section{Intro}\n");
    write(&expected, "linear_algebra/exercises/Sheet 1.tex", "% Sheet 1.tex by Ada");
    write(&expected, "linear_algebra/exercises/Sheet 2.tex", "% Sheet 2.tex by Ada");
    write(&expected, "tools/linear_algebra_tools.py", "# Linear Algebra Tools");

    assert!(!dir_diff::is_different(&output, &expected).unwrap());
}
