#![doc = r##"
bpmn-print: print BPMN workflows for developer readings.

This crate turns a folder of BPMN 2.0 process definitions into a printable PDF:
every `.bpmn` file becomes one page holding its flow diagram, laid out left to
right, followed by tables of the branch conditions, called activities and
service tasks, input parameters and JEXL scripts found in the document. It
powers the `bpmn-print` CLI and can be embedded in your own Rust applications.

Pipeline
--------
1. [`io::bpmn`] reads the XML into a [`BpmnDocument`].
2. [`core::layout`] computes a layered left-to-right layout.
3. [`io::writers::svg`] draws it, [`io::writers::png`] rasterizes it with resvg.
4. [`io::writers::pdf`] assembles the pages with lopdf.

Quick start: convert a folder
-----------------------------
```rust,no_run
use std::path::Path;
use bpmn_print::{ConvertOptions, convert_folder};

fn main() -> bpmn_print::Result<()> {
    let options = ConvertOptions {
        keep_png: true,
        ..Default::default()
    };
    let report = convert_folder(Path::new("processes"), Path::new("printed"), &options)?;
    println!("{} documents -> {:?}", report.documents, report.pdf_files);
    Ok(())
}
```

Render a single document
------------------------
```rust
use bpmn_print::{read_bpmn_str, render_bpmn_svg};

let xml = r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <process id="p">
    <startEvent id="s"/>
    <endEvent id="e"/>
    <sequenceFlow id="f" sourceRef="s" targetRef="e"/>
  </process>
</definitions>"#;

let doc = read_bpmn_str(xml).unwrap();
let svg = render_bpmn_svg(&doc);
assert!(svg.starts_with("<svg"));
```

Error handling
--------------
All public functions return `bpmn_print::Result<T>`; match on `bpmn_print::Error` to
handle specific cases.

```rust,no_run
use std::path::Path;
use bpmn_print::{ConvertOptions, Error, convert_folder};

fn main() {
    match convert_folder(Path::new("missing"), Path::new("out"), &ConvertOptions::default()) {
        Ok(_) => {}
        Err(Error::InputNotFound { path }) => eprintln!("no such folder: {}", path.display()),
        Err(Error::MalformedBpmn { path, source }) => eprintln!("{}: {source}", path.display()),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: high-level entry points.
- [`types`]: BPMN element kinds and page orientation.
- [`io`]: BPMN reader and SVG/PNG/PDF writers.
- [`core`]: layout, styling and conversion options.
- [`error`]: crate-level `Error` and `Result`.
"##]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::ConvertOptions;
pub use error::{Error, Result};
pub use types::{NodeKind, Orientation};

// Reader
pub use io::bpmn::{BpmnDocument, BpmnError, read_bpmn_file, read_bpmn_str};

// High-level API re-exports
pub use api::{
    ConversionReport, convert_folder, discover_bpmn_files, render_bpmn_svg, render_bpmn_to_png,
};
