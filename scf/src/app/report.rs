use crate::blocked::{SPIN_ALPHA, SPIN_BETA};
use crate::io::SeriesEntry;
use crate::wavefunction::Wavefunction;
use nalgebra::Vector3;
use tracing::info;

fn spin_label(spin: i32) -> &'static str {
    match spin {
        SPIN_ALPHA => "Alpha",
        SPIN_BETA => "Beta",
        _ => "Restricted",
    }
}

pub fn report_orbitals(key: &str, wfn: &Wavefunction) {
    let (Some(epsilon), Some(occupations)) = (wfn.epsilon(), wfn.occupations()) else {
        return;
    };
    info!("{} orbital energies:", key);
    for (irrep, spin, levels) in epsilon.iter() {
        let n_occ = occupations.get(irrep, spin).map_or(0, |o| o.len());
        info!("  {} ({:?}):", spin_label(spin), irrep);
        for (i, energy) in levels.iter().enumerate() {
            let marker = if i < n_occ { "occ" } else { "virt" };
            info!("    Level {:>3}: {:14.8} au  {}", i + 1, energy, marker);
        }
    }
}

pub fn report_series(entries: &[SeriesEntry], total: f64) {
    info!("Results:");
    for entry in entries {
        info!(
            "  {:<16} c = {:+.6}  E = {:18.10} au",
            entry.key, entry.coefficient, entry.energy
        );
    }
    info!("Weighted total energy: {:.10} au", total);
}

pub fn report_dipole(key: &str, dipole: &Vector3<f64>) {
    info!(
        "{} dipole moment (au): [{:+.6}, {:+.6}, {:+.6}] |mu| = {:.6}",
        key,
        dipole.x,
        dipole.y,
        dipole.z,
        dipole.norm()
    );
}
