//! Write a synthetic listings dataset for local runs of `home-search`.
//!
//! Usage: `generate_sample [OUT_DIR] [ROWS]` (defaults: `.` and 500).
//! Produces `sample_listings.csv` and `sample_listings.parquet` with the
//! same rows; about one listing in twenty has no bedroom count.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const STREETS: &[&str] = &[
    "Main", "Oak", "Lamar", "Congress", "Guadalupe", "Burnet", "Riverside", "Cesar Chavez",
    "Manor", "Red River", "Barton Springs", "Duval",
];
const SUFFIXES: &[&str] = &["St", "Ave", "Blvd", "Dr", "Ln", "Ct"];
const ZIPCODES: &[i64] = &[78701, 78702, 78703, 78704, 78745, 78751, 78757];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

struct Listing {
    address: String,
    beds: Option<i64>,
    baths: f64,
    price: i64,
    zipcode: i64,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Listing> {
    (0..rows)
        .map(|_| {
            let number = 100 + rng.below(9900);
            let street = rng.pick(STREETS);
            let suffix = rng.pick(SUFFIXES);
            // Skewed toward 2-4 bedrooms.
            let beds = match rng.below(20) {
                0 => None,
                1 => Some(1),
                2..=6 => Some(2),
                7..=13 => Some(3),
                14..=17 => Some(4),
                18 => Some(5),
                _ => Some(6),
            };
            let base = beds.unwrap_or(2);
            Listing {
                address: format!("{number} {street} {suffix}, Austin, TX"),
                beds,
                baths: 1.0 + 0.5 * rng.below(base as u64 * 2) as f64,
                price: 150_000 + base * 90_000 + rng.below(250) as i64 * 1_000,
                zipcode: *rng.pick(ZIPCODES),
            }
        })
        .collect()
}

fn write_csv(path: &Path, listings: &[Listing]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["address", "beds", "baths", "price", "zipcode"])?;
    for l in listings {
        writer.write_record([
            l.address.clone(),
            l.beds.map(|b| b.to_string()).unwrap_or_default(),
            l.baths.to_string(),
            l.price.to_string(),
            l.zipcode.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, listings: &[Listing]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("address", DataType::Utf8, false),
        Field::new("beds", DataType::Int64, true),
        Field::new("baths", DataType::Float64, false),
        Field::new("price", DataType::Int64, false),
        Field::new("zipcode", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(
                listings.iter().map(|l| l.address.as_str()),
            )),
            Arc::new(Int64Array::from(
                listings.iter().map(|l| l.beds).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from_iter_values(listings.iter().map(|l| l.baths))),
            Arc::new(Int64Array::from_iter_values(listings.iter().map(|l| l.price))),
            Arc::new(Int64Array::from_iter_values(listings.iter().map(|l| l.zipcode))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| String::from(".")));
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count '{n}'"))?,
        None => 500,
    };

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let listings = generate(rows, &mut rng);

    let csv_path = out_dir.join("sample_listings.csv");
    let parquet_path = out_dir.join("sample_listings.parquet");
    write_csv(&csv_path, &listings)?;
    write_parquet(&parquet_path, &listings)?;

    println!(
        "Wrote {rows} listings to {} and {}",
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
