//! Student CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::resolve_course;
use crate::domain::{Grade, Student, StudentId};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum StudentCommands {
    /// Register a student
    Add {
        /// Student ID (e.g. a student number)
        id: String,

        /// Full name
        name: String,
    },

    /// Record a final grade (replaces any earlier grade for the course)
    Grade {
        /// Student ID
        student: String,

        /// Course ID or code
        course: String,

        /// Letter grade A-F
        grade: Grade,
    },

    /// Show a student's transcript
    Show {
        /// Student ID
        student: String,
    },

    /// List students
    List,
}

pub fn run(cmd: StudentCommands, output: &Output) -> Result<()> {
    match cmd {
        StudentCommands::Add { id, name } => add_student(output, &id, &name),
        StudentCommands::Grade {
            student,
            course,
            grade,
        } => record_grade(output, &student, &course, grade),
        StudentCommands::Show { student } => show_student(output, &student),
        StudentCommands::List => list_students(output),
    }
}

/// Finds a student by ID in a loaded list
pub(crate) fn find_student<'a>(students: &'a [Student], id: &StudentId) -> Result<&'a Student> {
    students
        .iter()
        .find(|s| &s.id == id)
        .ok_or_else(|| anyhow::anyhow!("Student not found: {}", id))
}

fn add_student(output: &Output, id_str: &str, name: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.student_store();

    let id: StudentId = id_str.parse()?;
    if name.trim().is_empty() {
        anyhow::bail!("Student name is required");
    }

    let students = store.read_all()?;
    if students.iter().any(|s| s.id == id) {
        anyhow::bail!("Student already exists: {}", id);
    }

    let student = Student::new(id, name.trim());
    store.append(&student)?;

    if output.is_json() {
        output.data(&student);
    } else {
        output.success(&format!("Added student: {} - {}", student.id, student.name));
    }

    Ok(())
}

fn record_grade(output: &Output, student_str: &str, course_query: &str, grade: Grade) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;
    let course = resolve_course(&registry, course_query)?;

    let id: StudentId = student_str.parse()?;
    let mut students = project.load_students()?;
    let student = students
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| anyhow::anyhow!("Student not found: {}", id))?;

    let previous = student.record_grade(course.id.clone(), grade);
    output.verbose_ctx(
        "student",
        &format!("{} {}: {:?} -> {}", id, course.code, previous, grade),
    );
    project.save_students(&students)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "student": id.to_string(),
            "course": course.code,
            "grade": grade,
            "previous": previous,
        }));
    } else {
        output.success(&format!("Recorded {} in {} for {}", grade, course.code, id));
    }

    Ok(())
}

fn show_student(output: &Output, student_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    let id: StudentId = student_str.parse()?;
    let students = project.load_students()?;
    let student = find_student(&students, &id)?;

    if output.is_json() {
        output.data(student);
        return Ok(());
    }

    println!("Student: {}", student.id);
    println!("Name: {}", student.name);
    if student.grades.is_empty() {
        println!("\nNo grades recorded");
    } else {
        println!("\n{:<10} GRADE", "COURSE");
        for (course_id, grade) in &student.grades {
            println!("{:<10} {}", registry.code_of(course_id), grade);
        }
    }

    Ok(())
}

fn list_students(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let students = project.load_students()?;

    if output.is_json() {
        output.data(&students);
    } else if students.is_empty() {
        println!("No students");
    } else {
        println!("{:<12} {:<8} NAME", "ID", "GRADES");
        println!("{}", "-".repeat(40));
        for student in &students {
            println!(
                "{:<12} {:<8} {}",
                student.id.as_str(),
                student.grades.len(),
                student.name
            );
        }
    }

    Ok(())
}
