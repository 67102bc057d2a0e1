use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = autofind_query::Args::parse();
	autofind_query::run(args).await
}
