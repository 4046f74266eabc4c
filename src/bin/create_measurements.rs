use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const BUILTIN_STATIONS: &str = "\
Abha;18.0
Abidjan;26.0
Accra;26.4
Addis Ababa;16.0
Adelaide;17.3
Bulawayo;18.9
Cape Town;16.2
Dakar;24.0
Hamburg;9.7
Istanbul;13.9
Kunming;15.7
Lhasa;7.6
Ouagadougou;28.3
Petropavlovsk-Kamchatsky;1.9
Reykjavík;4.3
San Francisco;14.6
São Paulo;19.2
St. John's;5.0
Tromsø;2.9
Xi'an;14.1
Yakutsk;-8.8
Zürich;9.3";

/// Writes `station;temperature` records to stdout.
#[derive(Parser, Debug)]
#[command(name = "create_measurements", version, about)]
struct Args {
    /// Number of records, underscores allowed (1_000_000)
    count: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// `name;mean` station list, `#` lines ignored
    #[arg(long)]
    stations: Option<PathBuf>,
}

#[derive(Debug)]
struct City {
    name: String,
    distribution: Normal<f64>,
}

impl City {
    fn new(name: &str, mean: f64) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            distribution: Normal::new(mean, 10.0)
                .map_err(|err| anyhow!("bad distribution for {name}: {err}"))?,
        })
    }

    /// Tenths of a degree, clamped to the input grammar.
    fn sample(&self, rng: &mut impl Rng) -> i32 {
        let temp = self.distribution.sample(rng).clamp(-99.9, 99.9);
        (temp * 10.0).round() as i32
    }
}

#[derive(Debug)]
struct ParseCityError;

impl FromStr for City {
    type Err = ParseCityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, mean_str) = s.split_once(';').ok_or(ParseCityError)?;
        let mean: f64 = mean_str.trim().parse().map_err(|_| ParseCityError)?;
        City::new(name, mean).map_err(|_| ParseCityError)
    }
}

fn parse_cities(list: &str) -> Result<Vec<City>> {
    list.lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .map(|line| {
            line.parse()
                .map_err(|_| anyhow!("failed to parse station: {line}"))
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let count: u64 = args
        .count
        .replace('_', "")
        .parse()
        .with_context(|| format!("expected a record count, got {:?}", args.count))?;

    let cities = match &args.stations {
        Some(path) => {
            let list = fs::read_to_string(path)
                .with_context(|| format!("couldn't read {:?}", path))?;
            parse_cities(&list)?
        }
        None => parse_cities(BUILTIN_STATIONS)?,
    };
    if cities.is_empty() {
        return Err(anyhow!("station list is empty"));
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut out = BufWriter::with_capacity(1 << 20, io::stdout().lock());
    for _ in 0..count {
        let city = &cities[rng.random_range(0..cities.len())];
        let temp = city.sample(&mut rng);
        let sign = if temp < 0 { "-" } else { "" };
        let abs = temp.abs();
        writeln!(out, "{};{sign}{}.{}", city.name, abs / 10, abs % 10)?;
    }
    out.flush()?;

    Ok(())
}
