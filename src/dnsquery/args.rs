//! Manage command line arguments here.
use std::str::FromStr;
use std::time::Duration;

use clap::{App, Arg};

use dnslib::{
    error::DNSResult,
    rfc1035::{QClass, QType},
};

/// This structure holds the command line arguments.
#[derive(Debug)]
pub struct CliOptions {
    pub qtype: QType,
    pub qclass: QClass,
    pub ns: Option<String>,
    pub port: u16,
    pub domain: String,
    pub no_opt: bool,
    pub debug: bool,
    pub tcp: bool,
    pub timeout: Duration,
}

impl CliOptions {
    pub fn options() -> DNSResult<Self> {
        let matches = App::new("DNS query tool")
            .version("0.1")
            .author("Alain Viguier dandyvica@gmail.com")
            .about(
                r#"A simple DNS query client

            Project home page: https://github.com/dandyvica/dnsquery

            "#,
            )
            .arg(
                Arg::new("qtype")
                    .short('q')
                    .long("qtype")
                    .required(true)
                    .long_help("QType value")
                    .takes_value(true),
            )
            .arg(
                Arg::new("qclass")
                    .short('c')
                    .long("qclass")
                    .required(false)
                    .default_value("IN")
                    .long_help("QClass value")
                    .takes_value(true),
            )
            .arg(
                Arg::new("ns")
                    .short('n')
                    .long("ns")
                    .required(false)
                    .long_help("DNS server to address; defaults to /etc/resolv.conf")
                    .takes_value(true),
            )
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .required(false)
                    .default_value("53")
                    .long_help("Port of the DNS server to address")
                    .takes_value(true),
            )
            .arg(
                Arg::new("domain")
                    .short('d')
                    .long("domain")
                    .required(true)
                    .long_help("Domain to query")
                    .takes_value(true),
            )
            .arg(
                Arg::new("timeout")
                    .short('t')
                    .long("timeout")
                    .required(false)
                    .default_value("5")
                    .long_help("Overall timeout in seconds")
                    .takes_value(true),
            )
            .arg(
                Arg::new("tcp")
                    .short('s')
                    .long("tcp")
                    .required(false)
                    .long_help("Force the query over TCP instead of UDP")
                    .takes_value(false),
            )
            .arg(
                Arg::new("debug")
                    .short('g')
                    .long("debug")
                    .required(false)
                    .long_help("Debug mode")
                    .takes_value(false),
            )
            .arg(
                Arg::new("no-opt")
                    .short('o')
                    .long("no-opt")
                    .required(false)
                    .long_help("Don't send the EDNS OPT pseudo-RR")
                    .takes_value(false),
            )
            .get_matches();

        let domain = String::from(matches.value_of("domain").unwrap());
        let ns = matches.value_of("ns").map(String::from);
        let qtype = QType::from_str(&matches.value_of("qtype").unwrap().to_uppercase())?;
        let qclass = QClass::from_str(&matches.value_of("qclass").unwrap().to_uppercase())?;
        let port: u16 = matches
            .value_of("port")
            .unwrap()
            .parse()
            .map_err(|_| dnslib::error::DNSError::Config)?;
        let timeout_secs: u64 = matches
            .value_of("timeout")
            .unwrap()
            .parse()
            .map_err(|_| dnslib::error::DNSError::Config)?;

        Ok(CliOptions {
            qtype,
            qclass,
            ns,
            port,
            domain,
            no_opt: matches.is_present("no-opt"),
            debug: matches.is_present("debug"),
            tcp: matches.is_present("tcp"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
