use clap::ValueEnum;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Pretty-printed JSON of the whole outline
    Json,
    /// Indented human-readable tree
    Tree,
}

impl OutputFormat {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Tree => "tree",
        }
    }
}
