use crate::blocked::IrrepSpinMatrix;
use crate::common::{form_density, form_s12, nuclear_repulsion, occupations_for_system, orbitals};
use crate::error::{Result, ScfError};
use crate::fill::ao_one_electron;
use crate::method::{DerivReturn, EnergyMethod};
use crate::registry::ModuleContext;
use crate::wavefunction::Wavefunction;
use tracing::info;

/// Starting orbitals from the core Hamiltonian alone, ignoring electron
/// repulsion.
pub struct CoreGuess {
    ctx: ModuleContext,
}

impl CoreGuess {
    pub fn new(ctx: ModuleContext) -> Self {
        Self { ctx }
    }
}

impl EnergyMethod for CoreGuess {
    fn deriv(&mut self, order: usize, wfn: &Wavefunction) -> Result<DerivReturn> {
        if order != 0 {
            return Err(ScfError::NotImplemented(format!(
                "CoreGuess derivative of order {}",
                order
            )));
        }
        let system = wfn
            .system()
            .ok_or_else(|| ScfError::InvalidState("wavefunction has no system".to_string()))?;
        let options = self.ctx.options();

        let overlap = ao_one_electron(&self.ctx, &options.key_ao_overlap, system)?;
        let hcore = ao_one_electron(&self.ctx, &options.key_ao_corebuild, system)?;
        let s12 = form_s12(&overlap);
        let enuc = nuclear_repulsion(&self.ctx, system)?;

        let occupations = occupations_for_system(system)?;
        let mut core_fock = IrrepSpinMatrix::new();
        for (irrep, spin, _) in occupations.iter() {
            core_fock.insert(irrep, spin, hcore.clone())?;
        }
        let (cmat, epsilon) = orbitals(&core_fock, &s12)?;
        let opdm = form_density(&cmat, &occupations)?;

        let energy = opdm.iter().map(|(_, _, d)| d.dot(&hcore)).sum::<f64>() + enuc;
        info!("Core guess energy: {:.10}", energy);

        let wavefunction = wfn
            .clone()
            .with_cmat(cmat)
            .with_opdm(opdm)
            .with_occupations(occupations)
            .with_epsilon(epsilon);
        Ok(DerivReturn::energy(wavefunction, energy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocked::{Irrep, SPIN_ALPHA, SPIN_BETA, SPIN_RESTRICTED};
    use basis::{Atom, BasisLibrary, System};
    use nalgebra::Vector3;

    fn wavefunction(atoms: Vec<Atom>, multiplicity: usize) -> Wavefunction {
        let bs = BasisLibrary::sto3g().build(&atoms).unwrap();
        Wavefunction::from_system(
            System::new(atoms)
                .with_multiplicity(multiplicity)
                .with_basis_set("primary", bs),
        )
    }

    #[test]
    fn test_h2_core_guess() {
        let wfn = wavefunction(
            vec![
                Atom::new("H", 1.0, Vector3::zeros()),
                Atom::new("H", 1.0, Vector3::new(0.0, 0.0, 1.4)),
            ],
            1,
        );
        let mut guess = CoreGuess::new(ModuleContext::default());
        let result = guess.deriv(0, &wfn).unwrap();
        let new = &result.wavefunction;

        let eps = new.epsilon().unwrap().get(Irrep::A, SPIN_RESTRICTED).unwrap();
        // bonding orbital (H11 + H12) / (1 + S12)
        assert!((eps[0] - (-1.1204 - 0.9584) / 1.6593).abs() < 2e-4);
        let expected = 2.0 * eps[0] + 1.0 / 1.4;
        assert!((result.values[0] - expected).abs() < 1e-10);

        let d = new.opdm().unwrap().get(Irrep::A, SPIN_RESTRICTED).unwrap();
        let trace = (d * &ao_one_electron(&ModuleContext::default(), "OSOverlap", new.system().unwrap()).unwrap()).trace();
        assert!((trace - 2.0).abs() < 1e-10);
        // the input wavefunction is left untouched
        assert!(wfn.opdm().is_none());
    }

    #[test]
    fn test_open_shell_guess() {
        let wfn = wavefunction(vec![Atom::new("H", 1.0, Vector3::zeros())], 2);
        let mut guess = CoreGuess::new(ModuleContext::default());
        let result = guess.deriv(0, &wfn).unwrap();
        let occ = result.wavefunction.occupations().unwrap();
        assert_eq!(occ.get(Irrep::A, SPIN_ALPHA).unwrap().len(), 1);
        assert_eq!(occ.get(Irrep::A, SPIN_BETA).unwrap().len(), 0);
    }

    #[test]
    fn test_guess_errors() {
        let mut guess = CoreGuess::new(ModuleContext::default());
        assert!(matches!(
            guess.deriv(1, &Wavefunction::new()),
            Err(ScfError::NotImplemented(_))
        ));
        assert!(matches!(
            guess.deriv(0, &Wavefunction::new()),
            Err(ScfError::InvalidState(_))
        ));
    }
}
