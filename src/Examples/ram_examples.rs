use crate::Utils::plots::{PlottersRenderer, RamRenderer};
use crate::numerical::RAM::{ApproximationRequest, RamMethod, compute, compute_from_str};
use crate::numerical::RAM_study::{
    compare_methods, comparison_table, convergence_study, convergence_table, summary_table,
};
use crate::numerical::RAM_task::RamTask;
use strum::IntoEnumIterator;

pub fn ram_examples(example: usize) {
    match example {
        0 => {
            // default form values: LRAM on [1, 3] with 4 rectangles, drawn into a png
            let request = ApproximationRequest::default();
            let result = compute(&request).unwrap();
            println!("{}", summary_table(&request, &result));
            PlottersRenderer::new("LRAM_example.png")
                .render(&request, &result)
                .unwrap();
        }
        1 => {
            // trapezoids on [0, 2]: nodes 0, 1, 2 and f = 0, 5, 12
            let result = compute_from_str(0.0, 2.0, 2, "TRAM").unwrap();
            println!("nodes {:?}, f {:?}", result.sample_xs, result.sample_ys);
            for line in result.summary_lines() {
                println!("{}", line);
            }
        }
        2 => {
            // error of every rule while n is doubled
            for method in RamMethod::iter() {
                let rows = convergence_study(1.0, 3.0, method, 1, 10).unwrap();
                println!("{}", convergence_table(method, &rows));
            }
        }
        3 => {
            let results = compare_methods(1.0, 3.0, 16).unwrap();
            println!("{}", comparison_table(&results));
        }
        4 => {
            let input = r#"
            integration
              a: 0.0
              b: 2.0
              n: 8
              method: MRAM
            postprocessing
              plot: false
              convergence: 4
              compare: true
            "#;
            let task = RamTask::parse_settings_from_str(input).unwrap();
            let outcome = task.run().unwrap();
            for table in outcome.tables {
                println!("{}", table);
            }
        }
        5 => {
            // the two ways a request can be refused
            match compute_from_str(1.0, 3.0, 4, "XRAM") {
                Ok(_) => println!("unexpected success"),
                Err(e) => println!("{}", e),
            }
            match compute_from_str(-6.0, 0.0, 4, "LRAM") {
                Ok(_) => println!("unexpected success"),
                Err(e) => println!("{}", e),
            }
        }
        _ => {
            println!("no such example: {}", example);
        }
    }
}
