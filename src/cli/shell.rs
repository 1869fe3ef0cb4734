use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::cli::view::{print_rows, OutputFormat};
use crate::core::app::App;
use crate::core::scan::LineScanner;

const HELP: &str = "Commands: [g]enerate, [s]can, [l]ist, [h]elp, [q]uit";

/// Interactive loop: one command per line, handled to completion before the next.
pub async fn run<R>(app: &mut App, input: &mut R, format: OutputFormat) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
{
    app.cards_mut()
        .subscribe(move |entries| print_rows(entries, format));

    println!("{}", HELP);
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            "g" | "generate" => {
                if let Err(e) = app.generate() {
                    println!("Could not generate QR code: {}", e);
                }
            }
            "s" | "scan" => {
                println!("Scan a code now (empty line cancels):");
                let mut scanner = LineScanner::new(&mut *input);
                app.scan(&mut scanner).await;
            }
            "l" | "list" => print_rows(app.cards().entries(), format),
            "h" | "help" => println!("{}", HELP),
            "q" | "quit" | "exit" => break,
            other => println!("Unknown command: {}. {}", other, HELP),
        }
    }

    Ok(())
}
