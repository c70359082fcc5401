#![no_main]

use eon::backend::Target;
use eon::builtins::Builtins;
use eon::pipeline::{CompileOptions, Compiler};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Ignore invalid UTF-8
    if let Ok(s) = std::str::from_utf8(data) {
        let builtins = Builtins::init_default();
        // Meta loops can legitimately spin forever; bound them for fuzzing.
        let options = CompileOptions::new().with_max_meta_iterations(1_000);
        let mut compiler = Compiler::new(&builtins, options);
        let _ = compiler.compile(s, "fuzz.eon", Target::Cpp);
    }
});
