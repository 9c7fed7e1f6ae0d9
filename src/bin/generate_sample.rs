use serde_json::{json, Map, Value};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Cylinder-pressure-like trace in bar: motored hump plus combustion peak.
fn pressure_trace(angles: &[f64], peak_bar: f64, offset_bar: f64, rng: &mut SimpleRng) -> Vec<f64> {
    angles
        .iter()
        .map(|&a| {
            1.0 + gaussian(a, 0.0, 40.0, 25.0)
                + gaussian(a, 12.0, 15.0, peak_bar)
                + offset_bar
                + rng.gauss(0.0, 0.05)
        })
        .collect()
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Crank angle: -360 → 359.5 deg, step 0.5
    let angles: Vec<f64> = (0..1440).map(|i| -360.0 + i as f64 * 0.5).collect();
    // Intake-pressure reference sampled around BDC
    let ref_angles: Vec<f64> = (0..11).map(|i| -185.0 + i as f64).collect();
    let n_cycles = 50;

    let mut psaug = Vec::with_capacity(n_cycles);
    let mut sdref = Vec::with_capacity(n_cycles);
    let mut pcyl = Vec::with_capacity(n_cycles);
    let mut imep = Vec::with_capacity(n_cycles);
    let mut pmax = Vec::with_capacity(n_cycles);

    for _ in 0..n_cycles {
        let peak = 55.0 + rng.gauss(0.0, 3.0);
        let drift = rng.gauss(0.4, 0.1);

        // piezo channel drifts by `drift`; the reference sees the true level
        let trace = pressure_trace(&angles, peak, drift, &mut rng);
        let reference: Vec<f64> = ref_angles
            .iter()
            .map(|&a| 1.0 + gaussian(a, 0.0, 40.0, 25.0) + rng.gauss(0.0, 0.01))
            .collect();

        pmax.push(trace.iter().copied().fold(f64::MIN, f64::max));
        imep.push(8.0 + (peak - 55.0) * 0.1 + rng.gauss(0.0, 0.05));
        pcyl.push(pressure_trace(&angles, peak, 0.0, &mut rng));
        psaug.push(trace);
        sdref.push(reference);
    }

    let mut ca = Map::new();
    ca.insert(
        "PCYL1".into(),
        json!({ "data": pcyl, "axis": angles, "units": "bar", "description": "cylinder pressure 1" }),
    );
    ca.insert(
        "PSAUG".into(),
        json!({ "data": psaug, "axis": angles, "units": "bar", "description": "intake pressure (piezo)" }),
    );
    ca.insert(
        "SDREF".into(),
        json!({ "data": sdref, "axis": ref_angles, "units": "bar", "description": "intake pressure reference" }),
    );

    let record = json!({
        "header": { "date": "20240115103045", "test": "sample_run" },
        "engine": {
            "name": "SAMPLE-1C",
            "bore": 85.0,
            "stroke": 88.2,
            "conrod_length": 145.0,
            "compression_ratio": 11.5,
            "number_of_strokes": 4,
            "pin_offset": 0.0
        },
        "ca": Value::Object(ca),
        "cy": {
            "IMEP1": { "data": imep, "units": "bar", "description": "indicated mean effective pressure" },
            "PMAX1": { "data": pmax, "units": "bar", "description": "peak pressure" }
        },
        "parameters": {
            "SPEED": { "value": 2000, "unit": "rpm", "description": "engine speed" },
            "TORQUE": { "value": 85.3, "unit": "Nm", "description": "brake torque" },
            "OPERATOR": "bench-3"
        }
    });

    let output_path = "sample_record.json";
    let text = serde_json::to_string(&record).expect("Failed to serialize record");
    std::fs::write(output_path, text).expect("Failed to write output file");

    println!(
        "Wrote {n_cycles} cycles ({} crank-angle samples each) to {output_path}",
        angles.len()
    );
}
