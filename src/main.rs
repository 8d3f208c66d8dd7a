use std::env;

use tandem::flags::Flags;
use tandem::shell::Shell;

fn main() -> Result<(), tandem::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args);

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("Tandem {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let shell = Shell::new()?;
    shell.run()
}
