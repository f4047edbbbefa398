use std::fmt::Write;
use std::path::PathBuf;
use std::{env, fs};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // F1C100S GPIO ports with actual pin counts:
    // PA: 4 pins (PA0-PA3)
    // PB: 4 pins (PB0-PB3)
    // PC: 4 pins (PC0-PC3)
    // PD: 22 pins (PD0-PD21)
    // PE: 13 pins (PE0-PE12)
    // PF: 6 pins (PF0-PF5)
    let gpio_ports: &[(&char, u8)] = &[(&'A', 4), (&'B', 4), (&'C', 4), (&'D', 22), (&'E', 13), (&'F', 6)];

    // Generate singletons
    let mut singletons: Vec<String> = Vec::new();

    // Add GPIO pin singletons
    for (port, count) in gpio_ports {
        for pin_num in 0..*count {
            singletons.push(format!("P{}{}", port, pin_num));
        }
    }

    // Timer block: the AVS counters behind the access-time stopwatch
    singletons.push("TIMER".to_string());

    // _generated.rs
    let mut g = TokenStream::new();

    let singleton_tokens: Vec<_> = singletons.iter().map(|s| format_ident!("{}", s)).collect();

    g.extend(quote! {
        crate::peripherals_definition!(#(#singleton_tokens),*);
    });

    g.extend(quote! {
        crate::peripherals_struct!(#(#singleton_tokens),*);
    });

    // _macros.rs
    let mut m = String::new();

    // Generate foreach_pin macro
    let mut pins_table: Vec<Vec<String>> = Vec::new();
    for (port_num, (port, count)) in gpio_ports.iter().enumerate() {
        for pin_num in 0..*count {
            let pin_name = format!("P{}{}", port, pin_num);
            pins_table.push(vec![
                pin_name,
                format!("PIO{}", port),
                port_num.to_string(),
                pin_num.to_string(),
            ]);
        }
    }

    make_table(&mut m, "foreach_pin", &pins_table);

    // Write generated files
    let out_file = out_dir.join("_generated.rs").to_string_lossy().to_string();
    fs::write(out_file, g.to_string()).unwrap();

    let out_file = out_dir.join("_macros.rs").to_string_lossy().to_string();
    fs::write(out_file, m).unwrap();

    // The fixture runs from on-chip SRAM; the boot ROM loads it from SPI
    // flash. arm9-rt's link.x INCLUDEs memory.x.
    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("arm") {
        fs::write(out_dir.join("memory.x"), MEMORY_X).unwrap();
        println!("cargo:rustc-link-search={}", out_dir.display());
    }

    println!("cargo:rerun-if-changed=build.rs");
}

const MEMORY_X: &str = "MEMORY
{
    RAM : ORIGIN = 0x00000000, LENGTH = 32K
}
";

fn make_table(out: &mut String, name: &str, data: &Vec<Vec<String>>) {
    write!(
        out,
        "#[allow(unused)]
macro_rules! {} {{
    ($($pat:tt => $code:tt;)*) => {{
        macro_rules! __{}_inner {{
            $(($pat) => $code;)*
            ($_:tt) => {{}}
        }}
",
        name, name
    )
    .unwrap();

    for row in data {
        writeln!(out, "        __{}_inner!(({}));", name, row.join(",")).unwrap();
    }

    write!(
        out,
        "    }};
}}"
    )
    .unwrap();
}
