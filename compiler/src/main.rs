use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::info;

use c_backend::CSourceGenerator;
use compiler_core::CompilerSession;
use qbe_backend::QbeGenerator;

struct Options {
    path: String,
    debug: bool,
    qbe_only: bool,
}

fn parse_args() -> Option<Options> {
    let mut path = None;
    let mut debug = false;
    let mut qbe_only = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-d" => debug = true,
            "-q" => qbe_only = true,
            _ => path = Some(arg),
        }
    }
    Some(Options {
        path: path?,
        debug,
        qbe_only,
    })
}

fn main() -> ExitCode {
    env_logger::init();
    let Some(options) = parse_args() else {
        eprintln!("Usage: jsc <file> [-d] [-q]");
        return ExitCode::FAILURE;
    };
    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &Options) -> Result<()> {
    let source = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read {}", options.path))?;
    let mut session = CompilerSession::new();

    if options.debug {
        let tokens = session.tokenize(&source)?;
        println!("=== Tokens ===");
        for token in &tokens {
            println!(
                "Token: {:<12} | Lexeme: {:<15} | Line: {}",
                format!("{:?}", token.kind),
                token.lexeme,
                token.line
            );
        }
        println!();
    }

    let output = session.compile(&source)?;
    info!("compiled {}", options.path);

    if options.debug {
        println!("=== AST (after folding) ===");
        print!("{}", output.program.dump());
        println!();
        println!("=== IR ===");
        print!("{}", output.ir);
        println!();
        println!("=== CFG ===");
        print!("{}", output.cfg.dump());
        println!();
    }

    let qbe = QbeGenerator::new(&output.ir, &output.program, &output.types)
        .generate()
        .context("qbe generation failed")?;
    fs::write("out.qbe", qbe).context("failed to write out.qbe")?;
    println!("Generated QBE IR -> out.qbe");

    if options.qbe_only {
        return Ok(());
    }

    let c_source = CSourceGenerator::new(&output.program, &output.types)
        .generate()
        .context("c generation failed")?;
    fs::write("out.c", c_source).context("failed to write out.c")?;
    println!("Generated C source -> out.c");

    Ok(())
}
