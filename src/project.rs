// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Scratch projects: a source file, an optional background file and the
//! edits made to a `ScratchSampler`.
//!
//! Two on-disk forms exist. The binary `.scratch` form is two length-prefixed
//! path strings followed by the sampler record. The `.json` form carries the
//! same information as readable control point lists. Relative paths in either
//! form are resolved against the project file's directory.

mod document;
pub mod error;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::audio::{decode, SharedTrack};
use crate::sampler::ScratchSampler;

use document::ProjectDocument;
pub use error::ProjectError;

/// Longest path string accepted from a binary project file.
const MAX_PATH_BYTES: usize = 64 * 1024;

/// The on-disk form of a project, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectFormat {
    Binary,
    Json,
}

impl ProjectFormat {
    /// `.json` files are JSON; anything else is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ProjectFormat::Json,
            _ => ProjectFormat::Binary,
        }
    }
}

/// A scratch project with its audio loaded.
#[derive(Debug)]
pub struct Project {
    source_path: PathBuf,
    background_path: Option<PathBuf>,
    sampler: ScratchSampler,
}

impl Project {
    /// Starts a new project by decoding the source and, if given, the background.
    pub fn new(
        source_path: PathBuf,
        background_path: Option<PathBuf>,
    ) -> Result<Self, ProjectError> {
        Self::new_in(Path::new(""), source_path, background_path)
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn background_path(&self) -> Option<&Path> {
        self.background_path.as_deref()
    }

    pub fn sampler(&self) -> &ScratchSampler {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut ScratchSampler {
        &mut self.sampler
    }

    pub fn into_sampler(self) -> ScratchSampler {
        self.sampler
    }

    /// Opens a project file, decoding the audio it refers to.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let format = ProjectFormat::from_path(path);
        info!(path = ?path, ?format, "Opening project");
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let project = match format {
            ProjectFormat::Binary => {
                let mut reader = BufReader::new(File::open(path)?);
                let source = PathBuf::from(read_string(&mut reader)?);
                let background = read_string(&mut reader)?;
                let background = (!background.is_empty()).then(|| PathBuf::from(background));

                let mut project = Project::new_in(base, source, background)?;
                project.sampler.read_from(&mut reader)?;
                project
            }
            ProjectFormat::Json => {
                let document: ProjectDocument = serde_json::from_slice(&fs::read(path)?)?;
                let source = PathBuf::from(&document.filename_source);
                let background = document.background().map(PathBuf::from);

                let mut project = Project::new_in(base, source, background)?;
                document.apply(&mut project.sampler)?;
                project
            }
        };

        debug!(
            control_points = project.sampler.num_control_points(),
            volume_points = project.sampler.num_volume_control_points(),
            "Project loaded"
        );
        Ok(project)
    }

    /// Saves the project, choosing the form by extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let format = ProjectFormat::from_path(path);
        info!(path = ?path, ?format, "Saving project");

        let source = path_str(&self.source_path)?;
        let background = self.background_path.as_deref().map(path_str).transpose()?;
        match format {
            ProjectFormat::Binary => {
                let mut writer = BufWriter::new(File::create(path)?);
                write_string(&mut writer, source)?;
                write_string(&mut writer, background.unwrap_or(""))?;
                self.sampler.write_to(&mut writer)?;
                writer.flush()?;
            }
            ProjectFormat::Json => {
                let document = ProjectDocument::capture(
                    source.to_string(),
                    background.map(str::to_string),
                    &self.sampler,
                );
                let writer = BufWriter::new(File::create(path)?);
                serde_json::to_writer_pretty(writer, &document)?;
            }
        }
        Ok(())
    }

    /// Like `new`, but loads relative paths from `base` while keeping them
    /// relative in the project.
    fn new_in(
        base: &Path,
        source_path: PathBuf,
        background_path: Option<PathBuf>,
    ) -> Result<Self, ProjectError> {
        let mut sampler = ScratchSampler::new(load_track(&base.join(&source_path))?);
        if let Some(background_path) = &background_path {
            sampler.set_background(Some(load_track(&base.join(background_path))?));
        }

        Ok(Project {
            source_path,
            background_path,
            sampler,
        })
    }
}

fn load_track(path: &Path) -> Result<SharedTrack, ProjectError> {
    Ok(Arc::new(decode(path)?))
}

fn path_str(path: &Path) -> Result<&str, ProjectError> {
    path.to_str().ok_or_else(|| ProjectError::InvalidPath(path.to_path_buf()))
}

/// Writes `int32 length` followed by the raw bytes.
fn write_string<W: Write>(w: &mut W, s: &str) -> Result<(), ProjectError> {
    let len = i32::try_from(s.len())
        .map_err(|_| ProjectError::Corrupt(format!("string of {} bytes is too long", s.len())))?;
    w.write_all(&len.to_ne_bytes())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(r: &mut R) -> Result<String, ProjectError> {
    let mut word = [0u8; 4];
    r.read_exact(&mut word)?;
    let len = i32::from_ne_bytes(word);
    if len < 0 || len as usize > MAX_PATH_BYTES {
        return Err(ProjectError::Corrupt(format!("bad string length {}", len)));
    }

    let mut bytes = vec![0u8; len as usize];
    r.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| ProjectError::Corrupt(e.to_string()))
}
