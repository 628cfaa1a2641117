use super::{EvalConfig, ToleranceMode, DEFAULT_POLY_TICK_DIST, DEFAULT_REL_TOL};
use crate::utils::parse_number;
use anyhow::{anyhow, Result};
use clap::{App, Arg};

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

pub fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("baseline-measure")
        .version(env!("CARGO_PKG_VERSION"))
        .about(
            "Calculates baseline errors in a precision/recall manner.\n\
             Every line of a truth or reco txt file is a baseline polygon \
             x1,y1;x2,y2;...;xn,yn, lst files list one txt file per page.",
        )
        .arg(
            Arg::with_name("truth")
                .long("truth")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("truth file(s) in txt or lst format"),
        )
        .arg(
            Arg::with_name("reco")
                .long("reco")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("reco file(s) in txt or lst format, same order as the truth files"),
        )
        .arg(
            Arg::with_name("min-tol")
                .long("min-tol")
                .value_name("INT")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("minimum tolerance value, -1 for dynamic tolerances (default: -1)"),
        )
        .arg(
            Arg::with_name("max-tol")
                .long("max-tol")
                .value_name("INT")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("maximum tolerance value (default: -1)"),
        )
        .arg(
            Arg::with_name("rel-tol")
                .long("rel-tol")
                .value_name("FLOAT")
                .takes_value(true)
                .help("fraction of the interline distance used as tolerance (default: 0.25)"),
        )
        .arg(
            Arg::with_name("poly-tick-dist")
                .long("poly-tick-dist")
                .value_name("INT")
                .takes_value(true)
                .help("desired distance of the baseline points (default: 5)"),
        )
        .arg(
            Arg::with_name("operating-tick")
                .long("operating-tick")
                .value_name("INDEX")
                .takes_value(true)
                .help("tolerance tick reported as page value (default: mean over ticks)"),
        )
        .arg(
            Arg::with_name("threshold-tf")
                .long("threshold-tf")
                .value_name("FLOAT")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("threshold for true/false line counts, <= 0 disables them"),
        )
        .arg(
            Arg::with_name("articles")
                .long("articles")
                .help("blank lines separate articles, evaluate the article alignment as well"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("print the report as json"),
        )
        .arg(
            Arg::with_name("log-config")
                .long("log-config")
                .value_name("FILE")
                .takes_value(true)
                .help("log4rs configuration file (default: log4rs.yml)"),
        )
}

#[derive(Debug)]
pub struct EvalOptions<'a> {
    pub truth: &'a str,
    pub reco: &'a str,
    pub min_tol: i64,
    pub max_tol: i64,
    pub rel_tol: f64,
    pub poly_tick_dist: u32,
    pub operating_tick: Option<usize>,
    pub threshold_tf: Option<f64>,
    pub articles: bool,
    pub json: bool,
    pub log_config: &'a str,
}

impl Default for EvalOptions<'_> {
    fn default() -> Self {
        Self {
            truth: "",
            reco: "",
            min_tol: -1,
            max_tol: -1,
            rel_tol: DEFAULT_REL_TOL,
            poly_tick_dist: DEFAULT_POLY_TICK_DIST,
            operating_tick: None,
            threshold_tf: None,
            articles: false,
            json: false,
            log_config: DEFAULT_LOG_CONFIG,
        }
    }
}

impl<'a> EvalOptions<'a> {
    pub fn new(args: &'a clap::ArgMatches) -> Result<Self> {
        let mut opts = Self::default();
        if let Some(path) = args.value_of("truth") {
            opts.truth = path;
        }
        if let Some(path) = args.value_of("reco") {
            opts.reco = path;
        }
        if let Some(min_tol) = args.value_of("min-tol") {
            opts.min_tol = parse_number(min_tol, "min tol")?;
        }
        if let Some(max_tol) = args.value_of("max-tol") {
            opts.max_tol = parse_number(max_tol, "max tol")?;
        }
        if let Some(rel_tol) = args.value_of("rel-tol") {
            opts.rel_tol = parse_number(rel_tol, "rel tol")?;
        }
        if let Some(tick_dist) = args.value_of("poly-tick-dist") {
            opts.poly_tick_dist = parse_number(tick_dist, "poly tick dist")?;
        }
        if let Some(tick) = args.value_of("operating-tick") {
            opts.operating_tick = Some(parse_number(tick, "operating tick")?);
        }
        if let Some(threshold) = args.value_of("threshold-tf") {
            let threshold: f64 = parse_number(threshold, "threshold")?;
            // non positive values disable the counting
            if threshold > 0. {
                opts.threshold_tf = Some(threshold);
            }
        }
        if args.is_present("articles") {
            opts.articles = true;
        }
        if args.is_present("json") {
            opts.json = true;
        }
        if let Some(path) = args.value_of("log-config") {
            opts.log_config = path;
        }

        if opts.truth.is_empty() || opts.reco.is_empty() {
            return Err(anyhow!("No arguments given for <truth> or <reco>"));
        }
        Ok(opts)
    }

    pub fn eval_config(&self) -> Result<EvalConfig> {
        let config = EvalConfig {
            tolerance: ToleranceMode::from_limits(self.min_tol, self.max_tol, self.rel_tol)?,
            poly_tick_dist: self.poly_tick_dist,
            operating_tick: self.operating_tick,
        };
        config.validate()?;
        Ok(config)
    }
}
