use podium_prep::athletes::parse_athlete_list;
use podium_prep::literal::parse_literal;

/// Team-sized list cells, with the quoting variety seen in real exports.
fn sample_cells(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let members: Vec<String> = (0..(i % 6 + 1))
                .map(|j| {
                    if j % 3 == 0 {
                        format!("(\"Ann O'Neil {i}-{j}\", 'https://olympics.com/en/athletes/ann-{i}-{j}')")
                    } else {
                        format!("('Athlete {i}-{j}', 'https://olympics.com/en/athletes/a-{i}-{j}')")
                    }
                })
                .collect();
            format!("[{}]", members.join(", "))
        })
        .collect()
}

#[divan::bench(args = [1_000, 10_000])]
fn parse_athlete_cells(bencher: divan::Bencher, n: usize) {
    let cells = sample_cells(n);
    bencher.bench(|| {
        let mut total = 0;
        for cell in &cells {
            total += parse_athlete_list(Some(cell)).len();
        }
        total
    });
}

#[divan::bench]
fn parse_single_literal(bencher: divan::Bencher) {
    let cell = &sample_cells(6)[5];
    bencher.bench(|| parse_literal(divan::black_box(cell)).is_ok());
}

fn main() {
    divan::main();
}
