use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum SaveLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Bincode(bincode::Error),
    Decompress(String),
}

impl Display for SaveLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveLoadError::Io(e) => write!(f, "io error: {}", e),
            SaveLoadError::Json(e) => write!(f, "json error: {}", e),
            SaveLoadError::Bincode(e) => write!(f, "bincode error: {}", e),
            SaveLoadError::Decompress(e) => write!(f, "decompression error: {}", e),
        }
    }
}

impl Error for SaveLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SaveLoadError::Io(e) => Some(e),
            SaveLoadError::Json(e) => Some(e),
            SaveLoadError::Bincode(e) => Some(e),
            SaveLoadError::Decompress(_) => None,
        }
    }
}

impl From<std::io::Error> for SaveLoadError {
    fn from(e: std::io::Error) -> Self {
        SaveLoadError::Io(e)
    }
}

impl From<serde_json::Error> for SaveLoadError {
    fn from(e: serde_json::Error) -> Self {
        SaveLoadError::Json(e)
    }
}

impl From<bincode::Error> for SaveLoadError {
    fn from(e: bincode::Error) -> Self {
        SaveLoadError::Bincode(e)
    }
}

pub type Result<T> = std::result::Result<T, SaveLoadError>;

pub fn load_raw(p: impl AsRef<Path>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    BufReader::new(File::open(p)?).read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn save_raw(p: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let p = p.as_ref();
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut w = BufWriter::new(File::create(p)?);
    w.write_all(data)?;
    w.flush()?;
    Ok(())
}

/// A serialization format. Save/load helpers append the format's extension to the given stem.
pub trait Encoder {
    const EXTENSION: &'static str;

    fn encode(x: &impl Serialize) -> Result<Vec<u8>>;
    fn decode<T: DeserializeOwned>(x: &[u8]) -> Result<T>;

    fn filename(stem: impl AsRef<Path>) -> PathBuf {
        stem.as_ref().with_extension(Self::EXTENSION)
    }

    fn save(x: &impl Serialize, stem: impl AsRef<Path>) -> Option<()> {
        let path = Self::filename(stem);
        Self::encode(x)
            .and_then(|data| save_raw(&path, &data))
            .map_err(|e| log::error!("failed saving {}: {}", path.display(), e))
            .ok()?;
        log::info!("successfully saved {}", path.display());
        Some(())
    }

    fn load<T: DeserializeOwned>(stem: impl AsRef<Path>) -> Option<T> {
        let path = Self::filename(stem);
        let data = load_raw(&path).ok()?;
        Self::decode(&data)
            .map_err(|e| log::error!("failed deserializing {}: {}", path.display(), e))
            .map(|x| {
                log::info!("successfully loaded {}", path.display());
                x
            })
            .ok()
    }
}

pub struct JSON;

impl Encoder for JSON {
    const EXTENSION: &'static str = "json";

    fn encode(x: &impl Serialize) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(x)?)
    }

    fn decode<T: DeserializeOwned>(x: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(x)?)
    }
}

pub struct JSONPretty;

impl Encoder for JSONPretty {
    const EXTENSION: &'static str = "json";

    fn encode(x: &impl Serialize) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(x)?)
    }

    fn decode<T: DeserializeOwned>(x: &[u8]) -> Result<T> {
        JSON::decode(x)
    }
}

pub struct Bincode;

impl Encoder for Bincode {
    const EXTENSION: &'static str = "bin";

    fn encode(x: &impl Serialize) -> Result<Vec<u8>> {
        Ok(bincode::serialize(x)?)
    }

    fn decode<T: DeserializeOwned>(x: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(x)?)
    }
}

/// Bincode then deflate, for save files
pub struct CompressedBincode;

impl Encoder for CompressedBincode {
    const EXTENSION: &'static str = "binz";

    fn encode(x: &impl Serialize) -> Result<Vec<u8>> {
        let raw = Bincode::encode(x)?;
        Ok(miniz_oxide::deflate::compress_to_vec(&raw, 6))
    }

    fn decode<T: DeserializeOwned>(x: &[u8]) -> Result<T> {
        let raw = miniz_oxide::inflate::decompress_to_vec(x)
            .map_err(|e| SaveLoadError::Decompress(format!("{:?}", e)))?;
        Bincode::decode(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Thing {
        a: u32,
        b: Vec<String>,
    }

    fn thing() -> Thing {
        Thing {
            a: 3,
            b: vec!["x".into(), "yz".into()],
        }
    }

    #[test]
    fn encoders_agree() {
        let t = thing();
        let j: Thing = JSON::decode(&JSON::encode(&t).unwrap()).unwrap();
        let p: Thing = JSONPretty::decode(&JSONPretty::encode(&t).unwrap()).unwrap();
        let b: Thing = Bincode::decode(&Bincode::encode(&t).unwrap()).unwrap();
        let c: Thing = CompressedBincode::decode(&CompressedBincode::encode(&t).unwrap()).unwrap();
        assert_eq!(j, t);
        assert_eq!(p, t);
        assert_eq!(b, t);
        assert_eq!(c, t);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(JSON::decode::<Thing>(b"{not json").is_err());
        assert!(CompressedBincode::decode::<Thing>(&[1, 2, 3]).is_err());
    }
}
