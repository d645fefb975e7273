//! Where playing fields come from.
//!
//! The session engine only ever reads fields through [`FieldCatalog`]. Every
//! backend here loads its fields once at startup and serves them from memory.

use std::{collections::HashSet, fs, path::Path, sync::Arc};

use jirai_common::models::{FieldSize, MineField, Position};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, instrument};

use crate::{
    config::{DataSourceConfig, RandomFieldConfig},
    error::Error,
};

pub trait FieldCatalog: Send + Sync {
    fn list_fields(&self) -> Vec<Arc<MineField>>;

    fn get_field(&self, id: &str) -> Result<Arc<MineField>, Error>;
}

/// A fixed list of fields held in memory.
#[derive(Debug)]
pub struct MemoryCatalog {
    fields: Vec<Arc<MineField>>,
}

impl MemoryCatalog {
    pub fn new(fields: Vec<MineField>) -> Result<Self, Error> {
        let mut ids = HashSet::new();
        for field in &fields {
            if !ids.insert(field.id()) {
                return Err(Error::unavailable(format!(
                    "field id {} is defined more than once",
                    field.id()
                )));
            }
        }

        Ok(Self {
            fields: fields.into_iter().map(Arc::new).collect(),
        })
    }

    /// The built-in 8x8 field with 20 mines.
    pub fn sample() -> Self {
        #[rustfmt::skip]
        const MINES: [(i64, i64); 20] = [
            (0, 0), (0, 5), (0, 6),
            (1, 1), (1, 3), (1, 7),
            (2, 3), (2, 7),
            (3, 3), (3, 5),
            (4, 2), (4, 4), (4, 6),
            (5, 0), (5, 5),
            (6, 5), (6, 6), (6, 7),
            (7, 4), (7, 6),
        ];

        let mines = MINES.iter().map(|&(x, y)| Position(x, y)).collect();
        let field = MineField::new("sample-id", "sample", FieldSize(8, 8), mines)
            .expect("Built-in sample field must be valid");

        Self {
            fields: vec![Arc::new(field)],
        }
    }

    /// Reads a JSON array of fields.
    #[instrument(level = "trace")]
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::unavailable(format!("cannot read fields from {}: {e}", path.display()))
        })?;
        let fields: Vec<MineField> = serde_json::from_str(&text).map_err(|e| {
            Error::unavailable(format!("invalid fields in {}: {e}", path.display()))
        })?;

        info!("Loaded {} fields from {}", fields.len(), path.display());
        Self::new(fields)
    }

    /// Lays mines out at random for each requested field.
    #[instrument(level = "trace", skip(configs))]
    pub fn generate(configs: &[RandomFieldConfig], seed: Option<u64>) -> Result<Self, Error> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let fields = configs
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let size = FieldSize(field.width, field.height);
                size.check()
                    .map_err(|e| Error::unavailable(format!("field {}: {e}", field.name)))?;
                let mines = generate_mines(&mut rng, size, field.mines)?;
                debug!("Generated {} with {} mines", field.name, mines.len());
                MineField::new(format!("random-{index}"), field.name.clone(), size, mines)
                    .map_err(|e| Error::unavailable(format!("field {}: {e}", field.name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(fields)
    }
}

/// Picks `mines` distinct cells uniformly, clamped to the number of cells.
fn generate_mines<R: Rng>(
    rng: &mut R,
    size: FieldSize,
    mines: usize,
) -> Result<Vec<Position>, Error> {
    let length = size.cells();
    let mut mines_left = u32::try_from(mines.min(length))
        .map_err(|_| Error::unavailable(format!("too many mines for a {size} field")))?;
    let cells = u32::try_from(length)
        .map_err(|_| Error::unavailable(format!("field size {size} is too large")))?;
    let mut layout = Vec::with_capacity(mines_left as usize);

    for (index, cells_left) in (1..=cells).rev().enumerate() {
        if mines_left == 0 {
            break;
        }
        if rng.random_ratio(mines_left, cells_left) {
            layout.push(Position(
                (index % size.width()) as i64,
                (index / size.width()) as i64,
            ));
            mines_left -= 1;
        }
    }

    Ok(layout)
}

impl FieldCatalog for MemoryCatalog {
    fn list_fields(&self) -> Vec<Arc<MineField>> {
        self.fields.clone()
    }

    fn get_field(&self, id: &str) -> Result<Arc<MineField>, Error> {
        self.fields
            .iter()
            .find(|field| field.id() == id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{id} does not exist.")))
    }
}

/// Builds the catalog named by `datasource.type`.
pub fn from_config(config: &DataSourceConfig) -> Result<Arc<dyn FieldCatalog>, Error> {
    let kind = config
        .kind
        .as_deref()
        .ok_or_else(|| Error::unavailable("datasource.type is not defined"))?;

    let catalog = match kind {
        "sample" => MemoryCatalog::sample(),
        "file" => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| Error::unavailable("datasource.path is required for type file"))?;
            MemoryCatalog::from_file(path)?
        }
        "random" => MemoryCatalog::generate(&config.fields, config.seed)?,
        other => {
            return Err(Error::unavailable(format!(
                "unsupported datasource.type: {other}"
            )));
        }
    };

    info!(
        "Using {} datasource with {} fields",
        kind,
        catalog.fields.len()
    );
    Ok(Arc::new(catalog))
}
