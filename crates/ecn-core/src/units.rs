// ecn-core/src/units.rs

use uom::si::f64::{
    ElectricCurrent as UomElectricCurrent, ElectricPotential as UomElectricPotential,
    Energy as UomEnergy, ThermodynamicTemperature as UomThermodynamicTemperature,
    Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Current = UomElectricCurrent;
pub type Voltage = UomElectricPotential;
pub type Energy = UomEnergy;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn amp(v: f64) -> Current {
    use uom::si::electric_current::ampere;
    Current::new::<ampere>(v)
}

#[inline]
pub fn volt(v: f64) -> Voltage {
    use uom::si::electric_potential::volt;
    Voltage::new::<volt>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn joule(v: f64) -> Energy {
    use uom::si::energy::joule;
    Energy::new::<joule>(v)
}

// Extractors back to raw f64 at the solver boundary; the numeric core
// works in SI floats and only the public surfaces carry quantities.

#[inline]
pub fn amps(i: Current) -> f64 {
    use uom::si::electric_current::ampere;
    i.get::<ampere>()
}

#[inline]
pub fn volts(v: Voltage) -> f64 {
    use uom::si::electric_potential::volt;
    v.get::<volt>()
}

#[inline]
pub fn seconds(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

#[inline]
pub fn kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

#[inline]
pub fn joules(e: Energy) -> f64 {
    use uom::si::energy::joule;
    e.get::<joule>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_round_trip_si() {
        use uom::si::electric_current::milliampere;
        use uom::si::time::minute;
        assert_eq!(amp(2.0).get::<milliampere>(), 2000.0);
        assert_eq!(s(120.0).get::<minute>(), 2.0);
    }

    #[test]
    fn extractors_invert_constructors() {
        assert_eq!(amps(amp(1.5)), 1.5);
        assert_eq!(volts(volt(3.7)), 3.7);
        assert_eq!(seconds(s(0.25)), 0.25);
        assert_eq!(kelvin(k(298.15)), 298.15);
        assert_eq!(joules(joule(10.0)), 10.0);
    }
}
