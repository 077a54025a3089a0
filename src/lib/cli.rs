use clap::Parser;

/// Kubernetes Resource Report
///
/// Shows observed CPU/memory usage next to declared requests and limits
/// for every running pod, and rolls both up per node.
#[derive(Parser, Debug)]
#[command(name = "resource-report", author, version, about, styles=get_styles())]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress log output to stdout/stderr (logs still written to file)
    #[arg(short, long)]
    pub quiet: bool,

    /// Provide context name
    ///
    /// Use if you have multiple clusters in your kubeconfig
    #[arg(long)]
    pub context: Option<String>,

    /// Namespace to report pod usage for (default: all namespaces)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Output format: table (default) or json
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output: OutputFormat,
}

/// Output format for the report
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Print the pod and node reports as two plain-text tables
    Table,
    /// Output the report as JSON
    Json,
}

/// Set color and variants for help description
///
/// Thanks to [Praveen Perera](https://stackoverflow.com/a/76916424)
fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}
