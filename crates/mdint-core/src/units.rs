//! MD unit system constants (nm, ps, amu, kJ/mol, K).

/// Molar Boltzmann constant in kJ/(mol K).
pub const BOLTZMANN_KJ_PER_MOL_K: f64 = 0.008_314_462_618;

/// Picoseconds per femtosecond.
pub const PS_PER_FS: f64 = 1.0e-3;

/// Nanometres per angstrom.
pub const NM_PER_ANGSTROM: f64 = 0.1;

/// Thermal energy `k_B T` in kJ/mol for a temperature in kelvin.
pub fn thermal_energy(temperature: f64) -> f64 {
    BOLTZMANN_KJ_PER_MOL_K * temperature
}

/// Converts femtoseconds to picoseconds.
pub fn femtoseconds(value: f64) -> f64 {
    value * PS_PER_FS
}

/// Converts angstroms to nanometres.
pub fn angstroms(value: f64) -> f64 {
    value * NM_PER_ANGSTROM
}
