use julkalender::catalog::{doors, validate_catalog};

fn main() {
    match validate_catalog() {
        Ok(()) => println!("All {} doors are valid.", doors().len()),
        Err(e) => {
            eprintln!("Door catalog is invalid: {e}");
            std::process::exit(1);
        }
    }
}
