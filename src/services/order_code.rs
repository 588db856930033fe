//! Códigos públicos de pedido
//!
//! Formato `PED-####A`: cuatro dígitos aleatorios con ceros a la izquierda.
//! No se verifica unicidad contra la base.

use rand::Rng;

/// Arma el código a partir de un número en `0..10000`
pub fn format_order_code(number: u16) -> String {
    format!("PED-{:04}A", number % 10_000)
}

/// Genera un código nuevo con la fuente de aleatoriedad dada
pub fn generate_order_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    format_order_code(rng.gen_range(0..10_000))
}

/// Código nuevo con el generador del hilo actual
pub fn new_order_code() -> String {
    generate_order_code(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_order_code(4821), "PED-4821A");
        assert_eq!(format_order_code(7), "PED-0007A");
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let a = generate_order_code(&mut StdRng::seed_from_u64(42));
        let b = generate_order_code(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.starts_with("PED-") && a.ends_with('A'));
        assert_eq!(a.len(), 9);
    }
}
