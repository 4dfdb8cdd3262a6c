//! Interactive prompt for composing manipulator telecommands.
//!
//! Commands typed at the prompt are printed back as the JSON packets the
//! exec accepts, ready to be pasted into a TC script.

use color_eyre::Report;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use structopt::StructOpt;

use comms_if::tc::{manip_ctrl::TrajCmd, Tc};

const PROMPT: &str = "Manip $ ";
const HISTORY_PATH: &str = "history.txt";

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let mut rl = DefaultEditor::new()?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    println!("Type help for the command list, Ctrl-D to finish");

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                parse(&line);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Unhandled error: {:?}", err);
                break;
            }
        }
    }

    rl.save_history(HISTORY_PATH)?;

    Ok(())
}

fn parse(line: &str) {
    let mut words = line.split_whitespace();

    match words.next() {
        Some("safe") => println!("{}", Tc::MakeSafe.to_json()),
        Some("unsafe") => println!("{}", Tc::MakeUnsafe.to_json()),
        Some("stop") => println!("{}", Tc::StopTraj.to_json()),
        Some("traj") => {
            // from_iter_safe expects argv[0] first, reuse the command word
            match TrajCmd::from_iter_safe(std::iter::once("traj").chain(words)) {
                Ok(cmd) => println!("{}", Tc::StartTraj(cmd).to_json()),
                Err(e) => println!("{}", e),
            }
        }
        Some("help") => help(),
        Some(other) => println!("Unknown command {:?}, try help", other),
        None => (),
    }
}

fn help() {
    println!("safe                   put the exec into safe mode");
    println!("unsafe                 leave safe mode");
    println!("stop                   stop the active trajectory");
    println!("traj <family> <args>   start a trajectory, traj --help lists the families");
}
