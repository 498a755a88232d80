//! `giaoan catalog`: the choice lists and defaults of the plan form.

use giaoan_core::catalog;

pub fn run_catalog() {
    println!("Lĩnh vực (--activity-type):");
    for activity in catalog::ACTIVITY_TYPES {
        let marker = if activity == catalog::DEFAULT_ACTIVITY_TYPE { "*" } else { " " };
        println!("  {marker} {activity}");
    }
    println!();
    println!("Độ tuổi (--age-group):");
    for age in catalog::AGE_GROUPS {
        let marker = if age == catalog::DEFAULT_AGE_GROUP { "*" } else { " " };
        println!("  {marker} {age}");
    }
    println!();
    println!("Thời gian mặc định (--duration): {}", catalog::DEFAULT_DURATION);
    println!("Ngày mặc định: {}", catalog::today());
    println!();
    println!("* = giá trị mặc định");
}
