use crate::{Error, Result};

/// Separator Artifactory uses in place of `:` when a digest names a directory or file.
const PATH_SEPARATOR: &str = "__";

// https://github.com/opencontainers/image-spec/blob/main/descriptor.md#digests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OciDigest {
    algorithm: RegisteredImageSpecAlgorithm,
    encoded: String,
}

impl TryFrom<&str> for OciDigest {
    type Error = Error;
    fn try_from(s: &str) -> Result<Self> {
        let i = match s.find(':') {
            Some(i) => i,
            None => return Err(Error::InvalidDigest(s.to_string())),
        };
        let algo: &str = match s.get(..i) {
            Some(a) if !a.is_empty() => a,
            _ => return Err(Error::InvalidDigest(s.to_string())),
        };
        let encoded: &str = match s.get(i + 1..) {
            Some(e) if !e.is_empty() => e,
            Some(_) => return Err(Error::InvalidDigest(s.to_string())),
            None => return Err(Error::InvalidDigest(s.to_string())),
        };
        if !encoded.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidDigest(s.to_string()));
        }
        let algorithm = RegisteredImageSpecAlgorithm::try_from(algo)?;

        Ok(Self {
            algorithm,
            encoded: encoded.to_string(),
        })
    }
}

impl TryFrom<&String> for OciDigest {
    type Error = Error;
    fn try_from(s: &String) -> Result<Self> {
        OciDigest::try_from(s.as_str())
    }
}

impl std::fmt::Display for OciDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", String::from(&self.algorithm), self.encoded)
    }
}

impl OciDigest {
    /// Name of the directory or file holding this digest's content in the artifact store:
    /// `sha256:abcd` becomes `sha256__abcd`.
    pub fn path_component(&self) -> String {
        format!(
            "{}{}{}",
            String::from(&self.algorithm),
            PATH_SEPARATOR,
            self.encoded
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum RegisteredImageSpecAlgorithm {
    Sha256,
    Sha512,
}

impl TryFrom<&str> for RegisteredImageSpecAlgorithm {
    type Error = Error;

    fn try_from(a: &str) -> Result<Self> {
        match a {
            "sha512" => Ok(RegisteredImageSpecAlgorithm::Sha512),
            "sha256" => Ok(RegisteredImageSpecAlgorithm::Sha256),
            s => Err(Error::UnsupportedDigestAlgorithm(String::from(s))),
        }
    }
}

impl From<&RegisteredImageSpecAlgorithm> for String {
    fn from(a: &RegisteredImageSpecAlgorithm) -> String {
        match a {
            RegisteredImageSpecAlgorithm::Sha512 => String::from("sha512"),
            RegisteredImageSpecAlgorithm::Sha256 => String::from("sha256"),
        }
    }
}
