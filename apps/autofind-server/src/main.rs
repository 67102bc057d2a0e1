use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = autofind_server::Args::parse();
	autofind_server::run(args).await
}
