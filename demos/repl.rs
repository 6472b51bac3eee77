use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;
use unilisp::Translator;

fn main() {
    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

fn run_repl() {
    println!("unilisp - Lisp to UnityScript translator");
    println!("Enter forms like: (defn add [a b] (+ a b))");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("Could not initialize REPL");
    // Macros defined on one line stay available on the next
    let mut translator = Translator::new();

    loop {
        match rl.readline("unilisp> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":macros" => {
                        print_macros(&translator);
                        continue;
                    }
                    ":reset" => {
                        translator.reset_macros();
                        println!("Macros reset to the built-in set.");
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                match translator.try_translate(line) {
                    Ok(output) => {
                        println!("{output}");
                        for diagnostic in translator.diagnostics() {
                            println!("  warning: {diagnostic}");
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("Lisp to UnityScript translator:");
    println!("  :help      - Show this help message");
    println!("  :macros    - List registered macros");
    println!("  :reset     - Forget user macros");
    println!("  :quit      - Exit the translator");
    println!("  :exit      - Exit the translator");
    println!("  Ctrl+C     - Exit the translator");
    println!();
    println!("Examples:");
    println!("  (def ^int count 0)");
    println!("  (defn empty? [xs] (== (.-length xs) 0))");
    println!("  (defn blink [] (while true (yield (wait 1))))");
    println!("  (defmacro log-hi [] (print \"hi\"))");
    println!("  (map ~:name players)");
    println!();
}

fn print_macros(translator: &Translator) {
    let macros = translator.macros();
    println!("Registered macros ({} total):", macros.len());
    for name in macros.names() {
        let params = macros
            .lookup(name)
            .map(|def| def.params.join(" "))
            .unwrap_or_default();
        println!("  {name} [{params}]");
    }
}
