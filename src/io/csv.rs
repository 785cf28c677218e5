use std::io::{self, Write};
use std::path::Path;

use crate::dynamics::state::State;

/// Write trajectory data to CSV format.
///
/// Columns: time, x, y, z, phi, theta, psi (coordinates) followed by
///          a, b, c, d, e, f (auxiliary velocities).
pub fn write_trajectory<W: Write>(writer: &mut W, trajectory: &[State]) -> io::Result<()> {
    writeln!(writer, "time,x,y,z,phi,theta,psi,a,b,c,d,e,f")?;

    for s in trajectory {
        write!(writer, "{:.4}", s.time)?;
        for v in s.coords.iter() {
            write!(writer, ",{:.6}", v)?;
        }
        for v in s.rates.iter() {
            write!(writer, ",{:.6}", v)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, trajectory: &[State]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, trajectory)
}
