use clap::Parser;
use log::{debug, info};
use resource_report::{
    Cli, Config, KubernetesLoader, MetricsClient, ReportOutput, Result, build_report, gather,
    init_logger, render,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.verbose, cli.quiet)?;

    info!("Starting Kubernetes resource report");
    debug!("Context: {:?}", cli.context);
    debug!("Namespace: {:?}", cli.namespace);

    let config = Config::new(cli.context, cli.namespace);
    let kubernetes = KubernetesLoader::new(&config).await?;
    let metrics = MetricsClient::new(kubernetes.client(), config.namespace.clone());

    let snapshot = gather(&kubernetes, &metrics).await;
    let report = build_report(&snapshot);
    let output = ReportOutput::new(config.namespace.clone(), &report, &snapshot.failures);

    let mut stdout = std::io::stdout();
    render(&mut stdout, &output, cli.output)?;

    Ok(())
}
