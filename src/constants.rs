//! Common constants used throughout mkproject.

/// Supported configuration file names
pub const CONFIG_FILES: [&str; 3] = ["mkproject.json", "mkproject.yml", "mkproject.yaml"];

/// Ignore file read from the root of the file templates directory
pub const IGNORE_FILE: &str = ".mkprojectignore";

/// Extension of project template files
pub const PROJECT_TEMPLATE_EXT: &str = "yaml";

/// Directories never enumerated inside a template store
pub const IGNORED_TEMPLATE_DIRS: [&str; 3] = [".git", ".hg", ".svn"];

/// Files never enumerated inside a template store
pub const IGNORED_TEMPLATE_FILES: [&str; 5] =
    [".DS_Store", ".localized", "Thumbs.db", "desktop.ini", "._*"];

/// Extensions of file templates that are copied byte-for-byte instead of token-resolved.
pub const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "tif", "tiff", "webp", "psd", "heic",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "pages", "key",
    "numbers",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar", "dmg", "iso",
    // media
    "mp3", "wav", "flac", "ogg", "aac", "m4a", "mp4", "mov", "avi", "mkv", "webm",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // databases
    "db", "sqlite", "sqlite3", "mdb",
    // compiled artifacts
    "exe", "dll", "so", "dylib", "class", "pyc", "o", "a",
];

/// Name of the token lookup object exposed to dynamic code
pub const CONTEXT_VARIABLE: &str = "context";
