use clap::Parser;
use env_logger::Env;

use chip8::Params;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let params = Params::parse();

    if let Err(e) = chip8::run(params) {
        let mut chain = e.chain().peekable();

        match chain.next() {
            Some(e) => eprintln!("Error:\n    {}\n", e),
            None => eprintln!("Unknown error"),
        }

        if chain.peek().is_some() {
            eprintln!("Caused by:");

            for e in chain {
                eprintln!("    {}", e);
            }
        }

        std::process::exit(1);
    }
}
