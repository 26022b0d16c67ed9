//! Entrypoint for CLI
use std::{env, fs, time::Instant};

use chip8_interp::prelude::*;
use log::{debug, info};

mod clock;
mod conf;
mod error;

use self::{clock::Clock, conf::CliConf, error::AppResult};

static USAGE: &str = r#"
usage: chip8 CMD ROM [CONF]

commands:
    run     Run the target ROM file, then print the display
    dis     Disassemble the target ROM into readable assembly

options:
    CONF    YAML file with runner settings, for `run` only

examples:
    chip8 run breakout.rom
    chip8 run breakout.rom breakout.yaml
    chip8 dis breakout.rom
"#;

fn run_bytecode(filepath: impl AsRef<str>, conf: CliConf) -> AppResult<()> {
    info!("running bytecode interpreter");

    let bytecode = fs::read(filepath.as_ref())?;

    let mut vm = Chip8Vm::new(conf.vm_conf());
    vm.load_bytecode(bytecode.as_slice())?;
    info!("loaded {} ({} bytes)", filepath.as_ref(), bytecode.len());

    for key in &conf.keys {
        vm.set_key(*key, true);
    }

    let mut clock = Clock::new(conf.clock_frequency.interval());
    let mut draw_count = 0;
    let mut wait_count = 0;

    let start = Instant::now();
    for _ in 0..conf.max_steps {
        match vm.step() {
            Flow::Draw => draw_count += 1,
            Flow::KeyWait => wait_count += 1,
            Flow::Sound => debug!("beep"),
            _ => {}
        }
        clock.wait();
    }
    let end = Instant::now();

    info!(
        "{} steps in {}ms, {} draws, {} steps waiting for a key",
        conf.max_steps,
        end.duration_since(start).as_nanos() as f64 / 1000000.0, // to millis
        draw_count,
        wait_count,
    );
    debug!("{:?}", vm);

    println!("{}", vm.dump_display()?);

    Ok(())
}

fn run_disassembler(filepath: impl AsRef<str>) -> AppResult<()> {
    info!("running disassembler");

    let bytecode = fs::read(filepath.as_ref())?;
    if !check_program_size(&bytecode) {
        return Err(Chip8Error::LargeProgram {
            size: bytecode.len(),
        }
        .into());
    }

    Disassembler::new(bytecode.as_slice()).print_bytecode()?;

    Ok(())
}

fn main() -> AppResult<()> {
    if let Err(err) = simple_logger::SimpleLogger::new().env().init() {
        eprintln!("failed to install logger: {err}");
    }

    match parse_args() {
        Some(Cmd::Run { filepath, conf }) => {
            let conf = match conf {
                Some(conf_path) => CliConf::from_file(conf_path)?,
                None => CliConf::default(),
            };
            run_bytecode(filepath, conf)?
        }
        Some(Cmd::Dis { filepath }) => run_disassembler(filepath)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next() {
        Some(cmd) => {
            // don't format me T.T
            match cmd.as_str() {
                "run" => Some(Cmd::Run {
                    filepath: args.next()?,
                    conf: args.next(),
                }),
                "dis" => Some(Cmd::Dis {
                    filepath: args.next()?,
                }),
                _ => None,
            }
        }
        None => None,
    }
}

fn print_usage() {
    println!("Chip8 v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    /// Run file
    Run {
        filepath: String,
        conf: Option<String>,
    },
    /// Disassemble
    Dis { filepath: String },
}
