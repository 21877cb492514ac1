//! A DNS resource query
use log::debug;

use dnslib::transaction::Resolver;

mod args;
use args::CliOptions;

mod display;
use display::display_result;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("dnsquery error: {:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), dnslib::error::DNSError> {
    let options = CliOptions::options()?;
    debug!("options: {:?}", &options);

    let mut resolver = Resolver::new()?;

    match &options.ns {
        Some(ns) => resolver.set_nameserver_port(ns, &options.port.to_string())?,
        None => resolver.set_nameserver(None)?,
    }

    resolver.set_tcp(options.tcp);
    resolver.set_opt(!options.no_opt);

    resolver.query(options.qtype, options.qclass, &options.domain)?;
    let result = resolver.result(Some(options.timeout))?;

    display_result(&result);

    Ok(())
}
