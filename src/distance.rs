//! Levenshtein edit distance over Unicode code points.

/// Returns the minimum number of single-character insertions, deletions or
/// substitutions needed to turn `a` into `b`.
///
/// Characters are compared as `char`s, so a multi-byte code point counts as a
/// single unit. Only one row of `min(len(a), len(b)) + 1` cells is kept.
pub fn distance(a: &str, b: &str) -> usize {
    if a.is_empty() {
        return b.chars().count();
    }
    if b.is_empty() {
        return a.chars().count();
    }
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Columns follow the shorter string, rows the longer one.
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, &lc) in long.iter().enumerate() {
        // row[0] for the current line, and the diagonal from the previous one.
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let substitute = diagonal + usize::from(lc != sc);
            let delete = above + 1;
            let insert = row[j] + 1;

            diagonal = above;
            row[j + 1] = substitute.min(delete).min(insert);
        }
    }

    row[short.len()]
}
