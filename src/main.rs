mod app;
mod backend;
mod util;

use clap::Parser;

use backend::BackendClient;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the document-processing backend.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    backend_url: String,

    /// Identifier of the processed document to visualize.
    #[arg(long)]
    document_id: String,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1180.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "docgraph",
        options,
        Box::new(move |cc| {
            let client = BackendClient::new(&args.backend_url)?;
            Ok(Box::new(app::DocGraphApp::new(
                cc,
                client,
                args.document_id.clone(),
            )))
        }),
    )
}
