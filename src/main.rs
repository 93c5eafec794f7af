use crate::fleet::Fleet;
use crate::reservation::Reservation;
use crate::reservation::ReservationStatus::{Cancelled, Completed, Pending, Underway};
use crate::time::{parse_date, parse_datetime, parse_month};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tabled::Tabled;
use tabled::settings::Style;

mod availability;
mod bike;
mod fleet;
mod reservation;
mod station;
mod time;
mod vehicle_type;

#[derive(Parser)]
struct Args {
    /// Path to the JSON scenario file
    #[arg(short, long, value_name = "FILE", default_value = "data/default.json")]
    scenario: PathBuf,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let mut pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn())
        .expect("Failed to spawn pager");

    let mut stdin = pager.stdin.take().expect("Failed to open stdin for pager");

    if let Err(e) = stdin.write_all(content.as_bytes()) {
        // Broken pipe is common if the user quits the pager early
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error writing to pager: {}", e);
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = tabled::Table::new(&rows);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if rows.len() > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    println!("Depot online. Loaded fleet from {}", args.scenario.display());

    let mut fleet = Fleet::load_from_file(args.scenario.to_str().unwrap())?;

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "ls".to_string(),
            "bikes".to_string(),
            "types".to_string(),
            "stations".to_string(),
            "days".to_string(),
            "forbidden".to_string(),
            "until".to_string(),
            "reserve".to_string(),
            "cancel".to_string(),
            "dispatch".to_string(),
            "finish".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "ls" => {
                        let sub = parts.get(1).map(|s| *s).unwrap_or("a");
                        let filtered: Vec<&Reservation> = fleet.reservations.iter()
                            .filter(|r| match sub {
                                "p" | "pending" => r.status == Pending,
                                "u" | "underway" => r.status == Underway,
                                "f" | "finished" => r.status == Completed,
                                "c" | "cancelled" => r.status == Cancelled,
                                _ => true, // 'ls' or 'ls a'
                            })
                            .collect();
                        if filtered.is_empty() {
                            println!("No matching reservations found.")
                        } else {
                            print_table(filtered);
                        }
                    },
                    "bikes" => {
                        if fleet.bikes.is_empty() {
                            println!("No bikes in the fleet.")
                        } else {
                            print_table(fleet.bikes.iter().collect());
                        }
                    },
                    "types" => {
                        let mut types: Vec<_> = fleet.vehicle_types.values().collect();
                        types.sort_by(|a, b| a.id.cmp(&b.id));
                        print_table(types);
                    },
                    "stations" => {
                        let mut stations: Vec<_> = fleet.stations.values().collect();
                        stations.sort_by(|a, b| a.id.cmp(&b.id));
                        print_table(stations);
                    },
                    "days" => {
                        match (parts.get(1), parts.get(2).and_then(|s| parse_month(s))) {
                            (Some(type_id), Some(month)) => {
                                match fleet.allowed_days(&Arc::from(*type_id), month) {
                                    Ok(days) => {
                                        if days.is_empty() {
                                            println!("No day of the month takes a new reservation.");
                                        } else {
                                            let listed: Vec<String> =
                                                days.iter().map(|d| d.to_string()).collect();
                                            println!("{}", listed.join(" "));
                                        }
                                    },
                                    Err(e) => println!("{}", e.to_string().red()),
                                }
                            },
                            _ => println!("Usage: days <type_id> <YYYY-MM>"),
                        }
                    },
                    "forbidden" => {
                        match (parts.get(1), parts.get(2).and_then(|s| parse_date(s))) {
                            (Some(type_id), Some(day)) => {
                                match fleet.forbidden_ranges(&Arc::from(*type_id), day) {
                                    Ok(ranges) => {
                                        if ranges.is_empty() {
                                            println!("Reservations may start at any time on {}.", day);
                                        } else {
                                            print_table(ranges);
                                        }
                                    },
                                    Err(e) => println!("{}", e.to_string().red()),
                                }
                            },
                            _ => println!("Usage: forbidden <type_id> <YYYY-MM-DD>"),
                        }
                    },
                    "until" => {
                        match (parts.get(1), parts.get(2).and_then(|s| parse_datetime(s))) {
                            (Some(type_id), Some(start)) => {
                                match fleet.maximum_end(&Arc::from(*type_id), start) {
                                    Ok(maximum) => println!(
                                        "A reservation starting {} may run until {}.",
                                        start.format("%Y-%m-%dT%H:%M"),
                                        maximum.format("%Y-%m-%dT%H:%M")
                                    ),
                                    Err(e) => println!("{}", e.to_string().red()),
                                }
                            },
                            _ => println!("Usage: until <type_id> <YYYY-MM-DDTHH:MM>"),
                        }
                    },
                    "reserve" => {
                        let parsed = (
                            parts.get(1),
                            parts.get(2),
                            parts.get(3).and_then(|s| parse_datetime(s)),
                            parts.get(4).and_then(|s| parse_datetime(s)),
                        );
                        if let (Some(type_id), Some(station_id), Some(start), Some(end)) = parsed {
                            match fleet.reserve(Arc::from(*type_id), Arc::from(*station_id), start, end) {
                                Ok(id) => println!("{}", format!("Booked reservation {}.", id).green()),
                                Err(e) => println!("{}", format!("Rejected: {}.", e).red()),
                            }
                        } else {
                            println!("Usage: reserve <type_id> <station_id> <YYYY-MM-DDTHH:MM> <YYYY-MM-DDTHH:MM>");
                        }
                    },
                    "cancel" => {
                        if let Some(id) = parts.get(1) {
                            match fleet.cancel(&Arc::from(*id)) {
                                Ok(()) => println!("{}", format!("Cancelled reservation {}.", id).green()),
                                Err(e) => println!("{}", format!("Rejected: {}.", e).red()),
                            }
                        } else {
                            println!("Usage: cancel <reservation_id>");
                        }
                    },
                    "dispatch" => {
                        if let Some(now) = parts.get(1).and_then(|s| parse_datetime(s)) {
                            let assignments = fleet.dispatch(now);
                            println!("Dispatched {} bikes.", assignments.len());
                            for (reservation_id, bike_id) in assignments {
                                println!("  {} -> {}", bike_id, reservation_id);
                            }
                        } else {
                            println!("Usage: dispatch <YYYY-MM-DDTHH:MM>");
                        }
                    },
                    "finish" => {
                        if let (Some(id), Some(now)) = (parts.get(1), parts.get(2).and_then(|s| parse_datetime(s))) {
                            match fleet.finish(&Arc::from(*id), now) {
                                Ok(()) => println!("{}", format!("Finished reservation {}.", id).green()),
                                Err(e) => println!("{}", format!("Rejected: {}.", e).red()),
                            }
                        } else {
                            println!("Usage: finish <reservation_id> <YYYY-MM-DDTHH:MM>");
                        }
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls [status]                         - List reservations or filter by status: p - pending, u - underway, f - finished, c - cancelled");
                        println!("  bikes                               - List every bike with its state and station");
                        println!("  types                               - List the vehicle types and their reservation policies");
                        println!("  stations                            - List the stations");
                        println!("  days <type> <month>                 - Dates of <month> on which a new reservation may start");
                        println!("  forbidden <type> <date>             - Times of <date> at which no reservation may start");
                        println!("  until <type> <start>                - Latest end for a reservation starting at <start>");
                        println!("  reserve <type> <station> <s> <e>    - Book a vehicle of <type> at <station> for [<s>, <e>)");
                        println!("  cancel <id>                         - Cancel an active reservation");
                        println!("  dispatch <now>                      - Put bikes aside for reservations opening around <now>");
                        println!("  finish <id> <now>                   - End a reservation at <now> and free its bike");
                        println!("  help / ?                            - Show this help menu");
                        println!("  exit / quit                         - Exit the planner\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
