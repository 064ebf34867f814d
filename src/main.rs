use std::path::Path;

use anyhow::Result;
use thinfilm::output;
use thinfilm::settings::{self};

fn main() -> Result<()> {
    env_logger::init();

    let settings = settings::load_config()?;
    let multilayer = settings.build_multilayer()?;
    println!("Stack:\n{}", multilayer);

    let result = settings.sweep().solve(&multilayer)?;

    match &settings.output {
        Some(path) => {
            output::write(&result, Path::new(path))?;
            println!("Results written to {}", path);
        }
        None => {
            for (i, wavelength) in result.wavelengths.iter().enumerate() {
                for (j, angle) in result.angles.iter().enumerate() {
                    let powers = result.powers(i, j);
                    println!(
                        "{:>10.4} nm {:>8.3} deg  R = {:.6}  T = {:.6}  A = {:.6}",
                        wavelength,
                        angle.to_degrees(),
                        powers.reflected,
                        powers.transmitted,
                        powers.absorbed()
                    );
                }
            }
        }
    }

    Ok(())
}
