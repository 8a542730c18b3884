use onionboot::logging::init_logging;
use onionboot::ui::{MessageBlock, OutputMode, PlainRenderer, Renderer};
use onionboot::{parse_command, print_usage, usage, Command};

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output_mode = OutputMode::from_env();
    let cmd = match parse_command(args) {
        Ok(cmd) => cmd,
        Err(err) => {
            let mut renderer = PlainRenderer::stderr(output_mode);
            let _ = renderer.error_block(
                &MessageBlock::new("Invalid command arguments", err.to_string())
                    .with_hint("Run `onionboot --help` to see supported command forms"),
            );
            print_usage();
            std::process::exit(2);
        }
    };

    match cmd {
        Command::Help => {
            println!("{}", usage());
        }
        _ => match onionboot::runner::run_command(cmd) {
            Ok(output) => {
                if !output.trim().is_empty() {
                    println!("{output}");
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "command failed");
                let mut renderer = PlainRenderer::stderr(output_mode);
                let _ = renderer.error_block(&MessageBlock::new("Bootstrap failed", err.to_string()));
                std::process::exit(1);
            }
        },
    }
}
