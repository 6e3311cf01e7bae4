//! Maps file names to the language tag used on Markdown code fences.

use std::path::Path;

/// Extension-less (or fixed) file names with a conventional language.
const NAMED_FILES: &[(&str, &str)] = &[
    ("Dockerfile", "dockerfile"),
    ("Containerfile", "dockerfile"),
    ("Makefile", "makefile"),
    ("GNUmakefile", "makefile"),
    ("makefile", "makefile"),
    ("CMakeLists.txt", "cmake"),
    ("Jenkinsfile", "groovy"),
    ("Gemfile", "ruby"),
    ("Rakefile", "ruby"),
    ("Vagrantfile", "ruby"),
    ("Podfile", "ruby"),
    ("Procfile", "yaml"),
    ("Justfile", "just"),
    ("justfile", "just"),
    (".bashrc", "bash"),
    (".zshrc", "zsh"),
    (".gitignore", "gitignore"),
    (".dockerignore", "gitignore"),
    (".editorconfig", "ini"),
];

const EXTENSIONS: &[(&str, &str)] = &[
    // Systems
    ("rs", "rust"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hxx", "cpp"),
    ("go", "go"),
    ("zig", "zig"),
    ("swift", "swift"),
    ("m", "objectivec"),
    ("mm", "objectivec"),
    // JVM / .NET
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("groovy", "groovy"),
    ("gradle", "groovy"),
    ("clj", "clojure"),
    ("cs", "csharp"),
    ("fs", "fsharp"),
    // Scripting
    ("py", "python"),
    ("pyi", "python"),
    ("rb", "ruby"),
    ("php", "php"),
    ("pl", "perl"),
    ("lua", "lua"),
    ("r", "r"),
    ("jl", "julia"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("hs", "haskell"),
    ("ml", "ocaml"),
    ("dart", "dart"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "zsh"),
    ("fish", "fish"),
    ("ps1", "powershell"),
    ("bat", "batch"),
    ("cmd", "batch"),
    // Web
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("ts", "typescript"),
    ("jsx", "jsx"),
    ("tsx", "tsx"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("less", "less"),
    // Data and config
    ("json", "json"),
    ("jsonl", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("cfg", "ini"),
    ("xml", "xml"),
    ("svg", "xml"),
    ("csv", "csv"),
    ("sql", "sql"),
    ("graphql", "graphql"),
    ("gql", "graphql"),
    ("proto", "protobuf"),
    ("tf", "hcl"),
    ("hcl", "hcl"),
    ("nix", "nix"),
    // Docs
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("rst", "rst"),
    ("tex", "latex"),
    ("txt", "text"),
    // Build
    ("cmake", "cmake"),
    ("dockerfile", "dockerfile"),
    ("mk", "makefile"),
];

/// Returns the language tag for `path`, or `None` if no rule applies.
///
/// Conventional file names win over extensions, and any file whose name
/// starts with `readme` is treated as Markdown.
pub fn classify(path: &Path) -> Option<&'static str> {
    let file_name = path.file_name()?.to_str()?;

    if let Some((_, language)) = NAMED_FILES.iter().find(|(name, _)| *name == file_name) {
        return Some(*language);
    }

    if file_name.to_ascii_lowercase().starts_with("readme") {
        return Some("markdown");
    }

    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, language)| *language)
}
