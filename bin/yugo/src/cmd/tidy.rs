//! Tidy command - normalize an HTML document

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use color_eyre::eyre::{Result, WrapErr};

/// Run the tidy command.
///
/// Reads `file` (or stdin when `None`) and writes the normalized document to
/// stdout.
pub fn run(file: Option<&Path>) -> Result<()> {
    tidy_to(file, &mut io::stdout().lock())
}

fn tidy_to(file: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let html = match file {
        Some(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("Failed to read stdin")?;
            buf
        }
    };

    let tidy = yugo_tidy::render_normalized(&html).wrap_err("Failed to normalize HTML")?;
    out.write_all(tidy.as_bytes())
        .wrap_err("Failed to write output")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tidy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "<p>  one   two </p>").unwrap();

        let mut out = Vec::new();
        tidy_to(Some(&path), &mut out).unwrap();

        let html = String::from_utf8(out).unwrap();
        assert_eq!(
            html,
            "<html>\n    <head>\n    </head>\n    <body>\n        <p>\n            one two\n        </p>\n    </body>\n</html>\n"
        );
        assert_eq!(yugo_tidy::render_normalized(&html).unwrap(), html);
    }

    #[test]
    fn test_tidy_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");

        let err = tidy_to(Some(&path), &mut Vec::<u8>::new()).unwrap_err();
        assert!(err.to_string().contains("missing.html"));
    }
}
