//! Input/output functionality for molecular structures

use nalgebra::Vector3;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::atom::Atom;
use crate::molecule::Molecule;

const MOL2_ATOM_SECTION: &str = "@<TRIPOS>ATOM";
const MOL2_SECTION_PREFIX: &str = "@<TRIPOS>";
const MOL2_MIN_ATOM_FIELDS: usize = 9;

/// Errors that can occur during file I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Atom count mismatch: file has {file} atom records, molecule has {molecule} atoms")]
    AtomCountMismatch { file: usize, molecule: usize },

    #[error("No {0} section found")]
    MissingSection(&'static str),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

fn molecule_name(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
}

fn parse_field(field: &str, what: &str, line: usize) -> Result<f64, IoError> {
    field.trim().parse::<f64>().map_err(|_| IoError::Parse {
        line,
        message: format!("Invalid {}: {}", what, field),
    })
}

/// Parse a fixed-width column; a short line or a column cutting through a
/// multi-byte character is a parse error
fn parse_column(line: &str, columns: Range<usize>, what: &str, line_number: usize) -> Result<f64, IoError> {
    let field = line.get(columns.clone()).ok_or_else(|| IoError::Parse {
        line: line_number,
        message: format!("No {} in columns {}-{}: {}", what, columns.start + 1, columns.end, line),
    })?;
    parse_field(field, what, line_number)
}

/// Parse the `@<TRIPOS>ATOM` section of a MOL2 file into a Molecule.
///
/// Atoms keep the file's order. Records with fewer than nine fields are
/// skipped; coordinates are fields 2-4 and the partial charge is the last field.
/// A file without an atom section yields an empty molecule.
pub fn parse_mol2<P: AsRef<Path>>(path: P) -> Result<Molecule, IoError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut molecule = Molecule::new(molecule_name(path));

    let mut in_atom_section = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = idx + 1;

        if line.starts_with(MOL2_ATOM_SECTION) {
            in_atom_section = true;
            continue;
        }
        if !in_atom_section {
            continue;
        }
        if line.starts_with(MOL2_SECTION_PREFIX) {
            break;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MOL2_MIN_ATOM_FIELDS {
            continue;
        }

        let x = parse_field(fields[2], "x coordinate", line_number)?;
        let y = parse_field(fields[3], "y coordinate", line_number)?;
        let z = parse_field(fields[4], "z coordinate", line_number)?;
        let charge = parse_field(fields[fields.len() - 1], "partial charge", line_number)?;

        molecule.add_atom(Atom::new(Vector3::new(x, y, z), charge));
    }

    Ok(molecule)
}

/// Parse ATOM/HETATM records of a PDB file into a Molecule.
///
/// Coordinates come from columns 31-54; a charge, if present, from column 79 onward.
pub fn parse_pdb<P: AsRef<Path>>(path: P) -> Result<Molecule, IoError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut molecule = Molecule::new(molecule_name(path));

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = idx + 1;

        if !(line.starts_with("ATOM") || line.starts_with("HETATM")) {
            continue;
        }
        let x = parse_column(&line, 30..38, "x coordinate", line_number)?;
        let y = parse_column(&line, 38..46, "y coordinate", line_number)?;
        let z = parse_column(&line, 46..54, "z coordinate", line_number)?;

        let charge = line
            .get(78..)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_field(s, "charge", line_number))
            .transpose()?
            .unwrap_or(0.0);

        molecule.add_atom(Atom::new(Vector3::new(x, y, z), charge));
    }

    Ok(molecule)
}

/// Write a minimal MOL2 file containing only the atom coordinates and charges
pub fn write_mol2<P: AsRef<Path>>(molecule: &Molecule, path: P) -> Result<(), IoError> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "@<TRIPOS>MOLECULE")?;
    writeln!(file, "{}", molecule.name)?;
    writeln!(file, "{}", molecule.atoms.len())?;
    writeln!(file, "SMALL")?;
    writeln!(file, "USER_CHARGES")?;
    writeln!(file)?;
    writeln!(file, "{}", MOL2_ATOM_SECTION)?;

    for (i, atom) in molecule.atoms.iter().enumerate() {
        writeln!(
            file,
            "{:6} C {:10.4} {:10.4} {:10.4} C.3 {:4} MOLECULE {:10.4}",
            i + 1,
            atom.coordinates.x,
            atom.coordinates.y,
            atom.coordinates.z,
            1,
            atom.charge
        )?;
    }

    file.flush()?;
    Ok(())
}

/// Copy `original` to `updated`, replacing only the coordinates of each atom
/// record with those of `molecule` (paired by index).
///
/// Fails without writing anything if the atom counts differ.
pub fn update_mol2_coordinates<P: AsRef<Path>, Q: AsRef<Path>>(
    original: P,
    updated: Q,
    molecule: &Molecule,
) -> Result<(), IoError> {
    let reader = BufReader::new(File::open(original)?);

    let mut output = String::new();
    let mut atom_idx = 0;
    let mut in_atom_section = false;
    let mut saw_atom_section = false;

    for line in reader.lines() {
        let line = line?;

        if line.starts_with(MOL2_ATOM_SECTION) {
            in_atom_section = true;
            saw_atom_section = true;
            output.push_str(&line);
            output.push('\n');
            continue;
        }
        if in_atom_section && line.starts_with(MOL2_SECTION_PREFIX) {
            in_atom_section = false;
        }

        let mut fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if in_atom_section && fields.len() >= MOL2_MIN_ATOM_FIELDS {
            let atom = molecule.atoms.get(atom_idx).ok_or(IoError::AtomCountMismatch {
                file: atom_idx + 1,
                molecule: molecule.atoms.len(),
            })?;
            fields[2] = format!("{:.4}", atom.coordinates.x);
            fields[3] = format!("{:.4}", atom.coordinates.y);
            fields[4] = format!("{:.4}", atom.coordinates.z);
            output.push_str(&fields.join(" "));
            atom_idx += 1;
        } else {
            output.push_str(&line);
        }
        output.push('\n');
    }

    if !saw_atom_section {
        return Err(IoError::MissingSection(MOL2_ATOM_SECTION));
    }
    if atom_idx != molecule.atoms.len() {
        return Err(IoError::AtomCountMismatch {
            file: atom_idx,
            molecule: molecule.atoms.len(),
        });
    }

    fs::write(updated, output)?;
    Ok(())
}

/// Recursively collect files under `dir` whose name contains `needle`, sorted by path
pub fn find_files_with_substring<P: AsRef<Path>>(dir: P, needle: &str) -> Result<Vec<PathBuf>, IoError> {
    let root = glob::Pattern::escape(&dir.as_ref().to_string_lossy());
    let pattern = format!("{}/**/*{}*", root, glob::Pattern::escape(needle));

    let mut found = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if path.is_file() {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}

/// Short label for a structure file: the file name up to the first `_`, without `.mol2`
pub fn extract_file_label<P: AsRef<Path>>(path: P) -> String {
    let base = path
        .as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let head = base.split('_').next().unwrap_or(base);
    head.trim_end_matches(".mol2").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const LIGAND_MOL2: &str = "\
@<TRIPOS>MOLECULE
test
 2 1 0 0 0
SMALL
USER_CHARGES

@<TRIPOS>ATOM
      1 C1          1.0000    2.0000    3.0000 C.3     1  LIG1       -0.1500
      2 O1          4.5000   -1.2500    0.0000 O.2     1  LIG1        0.4000
@<TRIPOS>BOND
     1     1     2    1
";

    #[test]
    fn test_parse_mol2() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1abc_ligand.mol2");
        fs::write(&path, LIGAND_MOL2).unwrap();

        let mol = parse_mol2(&path).unwrap();
        assert_eq!(mol.name, "1abc_ligand");
        assert_eq!(mol.atoms.len(), 2);
        assert_eq!(mol.atoms[0].coordinates, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(mol.atoms[0].charge, -0.15);
        assert_eq!(mol.atoms[1].coordinates, Vector3::new(4.5, -1.25, 0.0));
        assert_eq!(mol.atoms[1].charge, 0.4);
    }

    #[test]
    fn test_parse_mol2_bad_coordinate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.mol2");
        fs::write(&path, LIGAND_MOL2.replace("2.0000", "two")).unwrap();

        match parse_mol2(&path) {
            Err(IoError::Parse { line, .. }) => assert_eq!(line, 8),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_mol2_missing_file() {
        assert!(matches!(parse_mol2("/nonexistent/x.mol2"), Err(IoError::Io(_))));
    }

    #[test]
    fn test_parse_pdb() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.pdb");
        let content = format!(
            "{}\n{}\nEND\n",
            "ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N  -0.30",
            "HETATM    2  C   LIG B   2       1.000   2.000   3.000  1.00  0.00           C"
        );
        fs::write(&path, content).unwrap();

        let mol = parse_pdb(&path).unwrap();
        assert_eq!(mol.atoms.len(), 2);
        assert_eq!(mol.atoms[0].coordinates, Vector3::new(11.104, 6.134, -6.504));
        assert_eq!(mol.atoms[0].charge, -0.30);
        assert_eq!(mol.atoms[1].charge, 0.0);
    }

    #[test]
    fn test_parse_pdb_non_ascii_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.pdb");
        // 'é' takes two bytes, so byte 30 falls inside it
        let record = format!("{}é{}", "ATOM      1  N   ALA A   1   ", " ".repeat(40));
        fs::write(&path, format!("{}\n", record)).unwrap();

        match parse_pdb(&path) {
            Err(IoError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_pdb_short_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.pdb");
        fs::write(&path, "REMARK ok\nATOM      1  N   ALA A   1      11.104\n").unwrap();

        assert!(matches!(parse_pdb(&path), Err(IoError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_update_mol2_coordinates() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("lig.mol2");
        let updated = dir.path().join("lig_out.mol2");
        fs::write(&original, LIGAND_MOL2).unwrap();

        let mut mol = parse_mol2(&original).unwrap();
        mol.translate(&Vector3::new(1.0, 1.0, 1.0));
        update_mol2_coordinates(&original, &updated, &mol).unwrap();

        let content = fs::read_to_string(&updated).unwrap();
        assert!(content.contains("@<TRIPOS>BOND"));
        assert!(content.contains("1 C1 2.0000 3.0000 4.0000 C.3 1 LIG1 -0.1500"));

        let reparsed = parse_mol2(&updated).unwrap();
        assert_eq!(reparsed.atoms[1].coordinates, Vector3::new(5.5, -0.25, 1.0));
        assert_eq!(reparsed.atoms[1].charge, 0.4);
    }

    #[test]
    fn test_update_mol2_atom_count_mismatch() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("lig.mol2");
        let updated = dir.path().join("lig_out.mol2");
        fs::write(&original, LIGAND_MOL2).unwrap();

        let mut mol = parse_mol2(&original).unwrap();
        mol.atoms.pop();

        assert!(matches!(
            update_mol2_coordinates(&original, &updated, &mol),
            Err(IoError::AtomCountMismatch { .. })
        ));
        assert!(!updated.exists());
    }

    #[test]
    fn test_write_mol2_round_trip() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("lig.mol2");
        fs::write(&original, LIGAND_MOL2).unwrap();
        let mol = parse_mol2(&original).unwrap();

        let written = dir.path().join("written.mol2");
        write_mol2(&mol, &written).unwrap();
        let reparsed = parse_mol2(&written).unwrap();
        assert_eq!(reparsed.atoms, mol.atoms);
    }

    #[test]
    fn test_find_files_and_labels() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("1abc_ligand.mol2"), "").unwrap();
        fs::write(dir.path().join("nested").join("2xyz_ligand.mol2"), "").unwrap();
        fs::write(dir.path().join("1abc_protein.mol2"), "").unwrap();
        fs::create_dir(dir.path().join("set[1]")).unwrap();
        fs::write(dir.path().join("set[1]").join("3def_ligand.mol2"), "").unwrap();

        let found = find_files_with_substring(dir.path(), "ligand").unwrap();
        assert_eq!(found.len(), 3);
        let labels: Vec<String> = found.iter().map(extract_file_label).collect();
        assert_eq!(labels, vec!["1abc", "2xyz", "3def"]);

        let bracketed = find_files_with_substring(dir.path().join("set[1]"), "ligand").unwrap();
        assert_eq!(bracketed.len(), 1);

        assert_eq!(extract_file_label("data/3def.mol2"), "3def");
    }
}
