use paramflow::commands::command_argument_builder;
use paramflow::handlers;
use paramflow_core::print_banner;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("analyze", primary_command)) => handlers::handle_analyze(primary_command),
        Some(("track", primary_command)) => handlers::handle_track(primary_command).await,
        None => {
            // No subcommand provided, just show the banner
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
