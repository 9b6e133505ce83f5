use hornlog::ast::Var;
use hornlog::{Context, TextualTheory};
use rustyline::error::ReadlineError;
use rustyline::Editor;

fn main() {
    let mut rl = Editor::<()>::new();
    let mut universe = TextualTheory::default();
    let mut tabled = false;
    loop {
        let readline = rl.readline("?- ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                if line.starts_with(':') {
                    let end_of_command = line.find(' ').unwrap_or(line.len());
                    match &line[0..end_of_command] {
                        ":reset" => {
                            universe = TextualTheory::default();
                        }
                        ":load" => {
                            if end_of_command == line.len() {
                                println!("Usage:\n\t:load <filename>");
                                continue;
                            }
                            let filename = &line[end_of_command + 1..];
                            match std::fs::read_to_string(filename) {
                                Ok(contents) => match universe.load_str(&contents) {
                                    Ok(()) => {
                                        println!("Loaded!");
                                    }
                                    Err(err) => {
                                        println!("Failed to parse: {}", err);
                                    }
                                },
                                Err(err) => {
                                    println!("Failed to load: {}", err);
                                }
                            }
                        }
                        ":list" => {
                            print!("{}", universe.pretty().theory_to_string(universe.theory()));
                        }
                        ":table" => {
                            tabled = !tabled;
                            println!(
                                "Tabled resolution is now {}.",
                                if tabled { "on" } else { "off" }
                            );
                        }
                        ":help" => {
                            println!(
                                "Available commands:
\t:help
\t:reset
\t:list
\t:table
\t:load <filename>"
                            )
                        }
                        other => {
                            println!("Unknown command: {}", other)
                        }
                    }
                } else {
                    match universe.prepare_query(&line) {
                        Ok(query) => {
                            let vars = query.var_slots();
                            let scope = query.scope.clone();
                            let mut ctx = Context::new();
                            let mut on_answer = |ctx: &mut Context| -> bool {
                                println!("Found solution:");
                                let pretty = universe.pretty();
                                for index in 0..vars {
                                    let var = Var::from_ord(index);
                                    match scope.as_ref().and_then(|s| s.name(var)) {
                                        Some(name) => print!("  ${} = ", name),
                                        None => print!("  ${} = ", index),
                                    }
                                    match ctx.binding(var) {
                                        Some(term) => println!(
                                            "{}",
                                            pretty.term_to_string(&term, scope.as_ref())
                                        ),
                                        None => println!("<any>"),
                                    }
                                }
                                // ask before searching for the next answer
                                matches!(rl.readline(".. "), Ok(_))
                            };
                            if tabled {
                                universe.theory().query_tabled(&mut ctx, &query, &mut on_answer);
                            } else {
                                universe.theory().query(&mut ctx, &query, &mut on_answer);
                            }
                            println!("No more solutions.");
                        }
                        Err(err) => {
                            println!("Failed to parse: {}", err);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Use CTRL+D for quitting.");
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}
