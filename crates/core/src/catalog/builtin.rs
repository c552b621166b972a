use crate::model::{Difficulty, Question, Subject};

use Difficulty::{Easy, Hard};
use Subject::{Algebra, Calculus, Equations};

/// `(subject, difficulty, prompt, canonical answer)`, all LaTeX.
const CATALOG: &[(Subject, Difficulty, &str, &str)] = &[
    (Algebra, Easy, r"\text{Simplify: } 3x + 5x", r"8x"),
    (Algebra, Easy, r"\text{Simplify: } 4(x + 2)", r"4x + 8"),
    (Algebra, Easy, r"\text{Simplify: } 2x \cdot 3x", r"6x^{2}"),
    (Algebra, Easy, r"\text{Simplify: } \frac{6x}{3}", r"2x"),
    (Algebra, Easy, r"\text{Simplify: } x^{2} \cdot x^{3}", r"x^{5}"),
    (Algebra, Easy, r"\text{Simplify: } 7a - 2a + 3", r"5a + 3"),
    (Algebra, Hard, r"\text{Expand: } (x + 3)^{2}", r"x^{2} + 6x + 9"),
    (Algebra, Hard, r"\text{Expand: } (2x - 1)(x + 4)", r"2x^{2} + 7x - 4"),
    (Algebra, Hard, r"\text{Simplify: } \frac{x^{2} - 9}{x - 3}", r"x + 3"),
    (Algebra, Hard, r"\text{Simplify: } \frac{x^{3} y^{2}}{x y}", r"x^{2} y"),
    (Algebra, Hard, r"\text{Expand: } (a + b)^{3}", r"a^{3} + 3a^{2}b + 3ab^{2} + b^{3}"),
    (Algebra, Hard, r"\text{Simplify: } \frac{1}{x} + \frac{1}{2x}", r"\frac{3}{2x}"),
    (Equations, Easy, r"\text{Solve for } x: x + 7 = 12", r"x = 5"),
    (Equations, Easy, r"\text{Solve for } x: 3x = 21", r"x = 7"),
    (Equations, Easy, r"\text{Solve for } x: 2x + 3 = 11", r"x = 4"),
    (Equations, Easy, r"\text{Solve for } x: \frac{x}{4} = 3", r"x = 12"),
    (Equations, Easy, r"\text{Solve for } x: 5x - 4 = 16", r"x = 4"),
    (Equations, Hard, r"\text{Solve for } x: 3(x - 2) = 2x + 5", r"x = 11"),
    (Equations, Hard, r"\text{Solve for } x: \frac{2x + 1}{3} = 5", r"x = 7"),
    (Equations, Hard, r"\text{Solve for } x: 4x - 7 = 2x + 2", r"x = \frac{9}{2}"),
    (Equations, Hard, r"\text{Solve for } x: \frac{x}{2} + \frac{x}{3} = 10", r"x = 12"),
    (Equations, Hard, r"\text{Solve for } x > 0: x^{2} = 49", r"x = 7"),
    (Equations, Hard, r"\text{Solve for } x: 0.5x + 1.5 = 4", r"x = 5"),
    (Calculus, Easy, r"\frac{d}{dx}\left(x^{3}\right)", r"3x^{2}"),
    (Calculus, Easy, r"\frac{d}{dx}\left(5x^{2} + 2x\right)", r"10x + 2"),
    (Calculus, Easy, r"\frac{d}{dx}\left(7x - 4\right)", r"7"),
    (Calculus, Easy, r"\int 2x \, dx", r"x^{2} + C"),
    (Calculus, Easy, r"\int 3 \, dx", r"3x + C"),
    (Calculus, Hard, r"\frac{d}{dx}\left(x^{2} e^{x}\right)", r"2x e^{x} + x^{2} e^{x}"),
    (Calculus, Hard, r"\frac{d}{dx}\left(\sin(x^{2})\right)", r"2x \cos(x^{2})"),
    (Calculus, Hard, r"\frac{d}{dx}\left(\frac{1}{x}\right)", r"-\frac{1}{x^{2}}"),
    (Calculus, Hard, r"\int \left(6x^{2} - 4x\right) dx", r"2x^{3} - 2x^{2} + C"),
    (Calculus, Hard, r"\frac{d}{dx}\left(\ln(x^{3})\right)", r"\frac{3}{x}"),
    (Calculus, Hard, r"\frac{d}{dx}\left(\sqrt{x}\right)", r"\frac{1}{2\sqrt{x}}"),
];

pub(super) fn questions() -> impl Iterator<Item = Question> {
    CATALOG
        .iter()
        .map(|&(subject, difficulty, prompt, answer)| Question::new(subject, difficulty, prompt, answer))
}
