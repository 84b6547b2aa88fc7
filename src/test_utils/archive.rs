use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

enum Entry {
    File {
        name: String,
        content: Vec<u8>,
        mode: Option<u32>,
    },
    Directory(String),
}

/// Builds ZIP archives in memory, entries in insertion order.
///
/// ```rust,no_run
/// use bang_launcher::test_utils::ZipBuilder;
///
/// let bytes = ZipBuilder::new()
///     .dir("bang-sdl-1.2/")
///     .file("bang-sdl-1.2/bin/app.exe", b"exe")
///     .build();
/// ```
#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<Entry>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries.push(Entry::File {
            name: name.to_string(),
            content: content.as_ref().to_vec(),
            mode: None,
        });
        self
    }

    /// File with explicit Unix permission bits.
    pub fn file_with_mode(mut self, name: &str, content: impl AsRef<[u8]>, mode: u32) -> Self {
        self.entries.push(Entry::File {
            name: name.to_string(),
            content: content.as_ref().to_vec(),
            mode: Some(mode),
        });
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push(Entry::Directory(name.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in self.entries {
            match entry {
                Entry::File { name, content, mode } => {
                    let mut options = SimpleFileOptions::default();
                    if let Some(mode) = mode {
                        options = options.unix_permissions(mode);
                    }
                    writer.start_file(name, options).expect("start zip entry");
                    writer.write_all(&content).expect("write zip entry");
                }
                Entry::Directory(name) => {
                    writer
                        .add_directory(name, SimpleFileOptions::default())
                        .expect("add zip directory");
                }
            }
        }

        writer.finish().expect("finish zip").into_inner()
    }
}
