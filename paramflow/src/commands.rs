use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("paramflow")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("paramflow")
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("analyze")
                .about("Correlate parameters across a captured traffic file")
                .arg(
                    arg!([CAPTURE])
                        .required(true)
                        .help("Path to the JSON capture file"),
                )
                .arg(
                    arg!(-s --"secrets-only" "Only report parameters that look sensitive")
                        .required(false),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .default_value("text")
                        .help("Report format: text or json"),
                ),
        )
        .subcommand(
            command!("track")
                .about("Detect origin relationships and build the parameter dependency graph")
                .arg(
                    arg!([CAPTURE])
                        .required(true)
                        .help("Path to the JSON capture file"),
                )
                .arg(
                    arg!(-a --"all" "Track every correlated parameter, not only likely secrets")
                        .required(false),
                )
                .arg(
                    arg!(-t --"threshold" <THRESHOLD>)
                        .required(false)
                        .default_value("0.5")
                        .help("Origin confidence threshold, 0.0 to 1.0"),
                )
                .arg(
                    arg!(-d --"dot" <PATH>)
                        .required(false)
                        .help("Write the origin graph as Graphviz DOT to PATH"),
                ),
        )
}
