mod archiver;
mod cli;
mod commands;
mod error;
mod weibo;

fn main() {
    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
