//! Implementation of `refql tokens`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use refql_query::{Lexer, TokenKind};

use crate::cli::{args::TokensCommand, output::dim};

/// Prints one table row per token, with the lexer state it was scanned in.
pub fn run(cmd: &TokensCommand) -> ExitCode {
    let mut lexer = Lexer::new(&cmd.query);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["#", "Kind", "Image", "Bytes", "Line:Col", "State"]);

    let mut count = 0;
    loop {
        let state = lexer.state();
        let token = match lexer.next_token() {
            Ok(token) => token,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        };
        if token.kind == TokenKind::Eof {
            break;
        }
        count += 1;
        table.add_row(vec![
            Cell::new(count),
            Cell::new(format!("{:?}", token.kind)),
            Cell::new(&token.image),
            Cell::new(format!("{}..{}", token.start, token.end)),
            Cell::new(format!("{}:{}", token.line, token.column)),
            Cell::new(format!("{state:?}")),
        ]);
    }

    if count == 0 {
        println!("{}", dim("(no tokens)"));
    } else {
        println!("{table}");
    }
    ExitCode::SUCCESS
}
