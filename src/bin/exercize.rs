use pocketcolor::cpu8080::exercize;
use std::{env, fs::File, io::Read, path::Path};

fn print_usage() {
    println!("Usage: exercize <rom_file>");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let mut rom = Vec::new();
    File::open(Path::new(&args[1]))?.read_to_end(&mut rom)?;

    let output = exercize::run(&rom);
    println!("{output}");

    Ok(())
}
